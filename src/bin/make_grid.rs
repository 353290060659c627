//! Generate a coarse model grid from a restart file.
//!
//! Finds the `*_rst.nc` file in the working directory, asks for a
//! resolution preset, and writes `<prefix>_grd.nc` alongside it.

use std::error::Error;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use croco_prep::io::{find_restart_file, read_dataset, write_grid};
use croco_prep::{create_grid, GridError, GridExtent, ResolutionPreset};

#[derive(Parser)]
#[command(about = "Generate a coarse model grid from a restart file")]
struct Cli {
    /// Directory to search for the `*_rst.nc` restart file.
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// Title attribute of the generated grid file.
    #[arg(long, default_value = "test_grid")]
    title: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("failed to initialize logging");
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let rst = find_restart_file(&cli.dir)?;
    println!("Using restart file {}", rst.display());

    let ds = read_dataset(&rst)?;
    let missing_value = ds
        .get("xl")
        .and_then(|var| var.data.iter().next().copied())
        .ok_or_else(|| GridError::MissingInput("restart file has no xl variable".into()))?;

    let preset = prompt_preset()?;
    let dl = preset.spacing()?;

    let extent = GridExtent::from_dataset(&ds)?.with_spacing(dl);
    let grid = create_grid(&extent, missing_value, &cli.title)?;

    let out = grid_path(&rst);
    write_grid(&grid, &out)?;
    println!("Wrote {}", out.display());
    Ok(())
}

/// Ask for the resolution configuration on stdin.
fn prompt_preset() -> Result<ResolutionPreset, Box<dyn Error>> {
    println!("Enter the resolution configuration");
    println!("1. High");
    println!("2. Medium");
    println!("3. Low");
    print!("> ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let choice: u32 = line
        .trim()
        .parse()
        .map_err(|_| GridError::MissingInput(format!("not a preset number: {}", line.trim())))?;
    Ok(ResolutionPreset::from_choice(choice)?)
}

/// `<prefix>_rst.nc` becomes `<prefix>_grd.nc`.
fn grid_path(rst: &std::path::Path) -> PathBuf {
    let name = rst
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("grid_rst.nc");
    let prefix = name.strip_suffix("_rst.nc").unwrap_or(name);
    rst.with_file_name(format!("{}_grd.nc", prefix))
}
