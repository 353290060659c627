//! Resolution presets for grid generation.

use std::fmt;

use crate::error::{GridError, GridResult};
use crate::types::GeoBounds;

/// Named resolution configuration for the grid generator.
///
/// Presets are selected interactively by number (1 = high, 2 = medium,
/// 3 = low). Each carries the domain bounds and the target zonal
/// spacing of the grid it describes.
///
/// # Example
///
/// ```
/// use croco_prep::types::ResolutionPreset;
///
/// let preset = ResolutionPreset::from_choice(1).unwrap();
/// assert_eq!(preset, ResolutionPreset::High);
/// assert!((preset.spacing().unwrap() - 0.012524).abs() < 1e-12);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResolutionPreset {
    /// ~1/80 degree spacing over the full shelf domain.
    High,
    /// ~1/40 degree spacing over the eastern subdomain.
    Medium,
    /// Reserved; not configured yet.
    Low,
}

impl ResolutionPreset {
    /// Parse a menu choice (1, 2, or 3).
    pub fn from_choice(choice: u32) -> GridResult<Self> {
        match choice {
            1 => Ok(ResolutionPreset::High),
            2 => Ok(ResolutionPreset::Medium),
            3 => Ok(ResolutionPreset::Low),
            other => Err(GridError::MissingInput(format!(
                "unknown resolution configuration {}",
                other
            ))),
        }
    }

    /// Domain bounds of the preset.
    pub fn bounds(&self) -> GridResult<GeoBounds> {
        match self {
            ResolutionPreset::High => Ok(GeoBounds::new(45.0, 50.0, -175.0, -60.0)),
            ResolutionPreset::Medium => Ok(GeoBounds::new(45.0, 50.0, -70.0, -60.0)),
            ResolutionPreset::Low => Err(GridError::MissingInput(
                "low-resolution preset is not configured".into(),
            )),
        }
    }

    /// Target zonal spacing in degrees.
    pub fn spacing(&self) -> GridResult<f64> {
        match self {
            ResolutionPreset::High => Ok(0.012524),
            ResolutionPreset::Medium => Ok(0.025048),
            ResolutionPreset::Low => Err(GridError::MissingInput(
                "low-resolution preset is not configured".into(),
            )),
        }
    }
}

impl fmt::Display for ResolutionPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionPreset::High => write!(f, "high"),
            ResolutionPreset::Medium => write!(f, "medium"),
            ResolutionPreset::Low => write!(f, "low"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_choice() {
        assert_eq!(
            ResolutionPreset::from_choice(1).unwrap(),
            ResolutionPreset::High
        );
        assert_eq!(
            ResolutionPreset::from_choice(2).unwrap(),
            ResolutionPreset::Medium
        );
        assert!(ResolutionPreset::from_choice(7).is_err());
    }

    #[test]
    fn test_preset_spacing() {
        assert!((ResolutionPreset::Medium.spacing().unwrap() - 0.025048).abs() < 1e-12);
        // Preset 3 exists in the menu but has no configuration.
        assert!(ResolutionPreset::Low.spacing().is_err());
        assert!(ResolutionPreset::Low.bounds().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ResolutionPreset::High.to_string(), "high");
    }
}
