//! Coarsen one or more model-output files.
//!
//! Every supplied path must exist; each file is then coarsened by the
//! configured factor and written next to its input as
//! `<stem>_coarse.nc`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use croco_prep::io::{CoarsenPreprocessor, Preprocessor};

#[derive(Parser)]
#[command(about = "Coarsen model-output files for a lower-resolution run")]
struct Cli {
    /// Model-output files to preprocess.
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Coarsening factor along each horizontal axis.
    #[arg(short = 'n', long, default_value_t = 4)]
    factor: usize,

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

    for path in &cli.paths {
        if !path.exists() {
            eprintln!("The path {} does not exist", path.display());
            return ExitCode::FAILURE;
        }
    }

    let preprocessor = CoarsenPreprocessor::new(cli.factor);
    for path in &cli.paths {
        if let Err(e) = preprocessor.preprocess(path) {
            eprintln!("failed to preprocess {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
