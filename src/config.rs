//! Simulator configuration: board dimensions and the spawn policy.
//!
//! Defaults give the classic game: a 4x4 board where new pieces are a `2`
//! 90% of the time and a `4` otherwise. Configs can be loaded from TOML:
//!
//! ```toml
//! width = 5
//! height = 5
//!
//! [spawn]
//! two_probability = 0.75
//! ```

use std::io::{self, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::simulator::{SimulatorError, INITIAL_PIECES};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Invalid(#[from] SimulatorError),
}

/// How new pieces are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPolicy {
    /// Probability that a spawned piece is a `2`; otherwise it is a `4`.
    #[serde(default = "defaults::two_probability")]
    pub two_probability: f64,
}

impl Default for SpawnPolicy {
    fn default() -> Self {
        Self { two_probability: defaults::two_probability() }
    }
}

/// Knobs for a [`crate::Simulator`]. Fields missing from a TOML file take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    #[serde(default = "defaults::width")]
    pub width: usize,
    #[serde(default = "defaults::height")]
    pub height: usize,
    #[serde(default)]
    pub spawn: SpawnPolicy,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self { width: defaults::width(), height: defaults::height(), spawn: SpawnPolicy::default() }
    }
}

impl SimulatorConfig {
    /// Default spawn policy on a `width x height` board.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, ..Self::default() }
    }

    pub fn with_two_probability(mut self, two_probability: f64) -> Self {
        self.spawn.two_probability = two_probability;
        self
    }

    /// Check that a simulator can be built from this config.
    ///
    /// The board must hold the starting pieces and the spawn probability
    /// must lie in `[0, 1]`.
    pub fn validate(&self) -> Result<(), SimulatorError> {
        let area = self.width.checked_mul(self.height);
        if area.map_or(true, |a| a < INITIAL_PIECES) {
            return Err(SimulatorError::InvalidDimensions { width: self.width, height: self.height });
        }
        let p = self.spawn.two_probability;
        if !(p.is_finite() && (0.0..=1.0).contains(&p)) {
            return Err(SimulatorError::InvalidConfig(format!(
                "spawn.two_probability must be within [0, 1], got {p}"
            )));
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut file = std::fs::File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Self::from_toml_str(&contents)
    }
}

mod defaults {
    pub fn width() -> usize { 4 }
    pub fn height() -> usize { 4 }
    pub fn two_probability() -> f64 { 0.9 }
}
