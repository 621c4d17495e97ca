//! Builder configuration.
//!
//! Load from TOML to change the planning horizon or solver limits without
//! code changes.
//!
//! # Examples
//!
//! ```
//! use u_meeting::config::MeetingConfig;
//!
//! let config = MeetingConfig::from_toml_str(r#"
//!     model_name = "week 12"
//!
//!     [horizon]
//!     min = 0
//!     max = 10080
//!
//!     [solver]
//!     time_limit_ms = 5000
//! "#).unwrap();
//!
//! assert_eq!(config.horizon.span(), 10080);
//! assert_eq!(config.solver.num_workers, 1);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::SolverConfig;
use crate::error::{Error, Result};

/// Planning window, in minutes. Optimizable meetings start and end inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Horizon {
    pub min: i64,
    pub max: i64,
}

impl Horizon {
    pub const DEFAULT_MIN: i64 = 61_420_800;
    pub const DEFAULT_MAX: i64 = 61_431_000;

    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Requires `0 <= min < max`.
    pub fn validate(&self) -> Result<()> {
        if self.min < 0 || self.max < 0 {
            return Err(Error::Configuration(format!(
                "horizon bounds must be non-negative, got [{}, {}]",
                self.min, self.max
            )));
        }
        if self.max <= self.min {
            return Err(Error::Configuration(format!(
                "horizon max {} must exceed min {}",
                self.max, self.min
            )));
        }
        Ok(())
    }

    pub fn span(&self) -> i64 {
        self.max - self.min
    }

    pub fn contains(&self, time: i64) -> bool {
        self.min <= time && time <= self.max
    }
}

impl Default for Horizon {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MIN, Self::DEFAULT_MAX)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeetingConfig {
    /// Name given to the built CP model.
    pub model_name: String,
    pub horizon: Horizon,
    /// Passed through to the solver untouched.
    pub solver: SolverConfig,
}

impl Default for MeetingConfig {
    fn default() -> Self {
        Self {
            model_name: "meetings".to_string(),
            horizon: Horizon::default(),
            solver: SolverConfig::default(),
        }
    }
}

impl MeetingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file doesn't exist, contains invalid TOML or
    /// describes an invalid horizon.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_toml_file(path)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_horizon(mut self, horizon: Horizon) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = name.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.horizon.validate()?;
        if self.solver.time_limit_ms <= 0 {
            return Err(Error::Configuration(
                "solver time_limit_ms must be positive".to_string(),
            ));
        }
        if self.solver.num_workers == 0 {
            return Err(Error::Configuration(
                "solver num_workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
