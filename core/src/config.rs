//! Harness configuration: defaults, optional TOML file, environment.

use std::path::Path;
use std::{env, fmt, fs};

use serde::{Deserialize, Serialize};

use crate::grid::{GridSpec, MAX_GRID_POINTS};
use crate::shape::Family;

pub const DEFAULT_TRIALS: u64 = 1_000_000;

pub const ENV_TRIALS: &str = "PIPBENCH_TRIALS";
pub const ENV_FAMILY: &str = "PIPBENCH_FAMILY";
pub const ENV_LOG_LEVEL: &str = "PIPBENCH_LOG_LEVEL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid environment variable value for {key}: {value}")]
    InvalidEnvVar { key: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Compact => write!(f, "compact"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!("unknown log format: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `info` or `pipbench_core=debug`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub trials: u64,
    pub family: Family,
    pub grid: GridSpec,
    pub logging: LoggingConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            family: Family::Polygon,
            grid: GridSpec::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl HarnessConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    /// Defaults, then `path` if given, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env(|k| env::var(k).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Applies overrides through `lookup`, so tests need not touch the process env.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_TRIALS) {
            self.trials = v.trim().replace('_', "").parse().map_err(|_| ConfigError::InvalidEnvVar {
                key: ENV_TRIALS.to_string(),
                value: v.clone(),
            })?;
        }
        if let Some(v) = lookup(ENV_FAMILY) {
            self.family = v.parse().map_err(|_| ConfigError::InvalidEnvVar {
                key: ENV_FAMILY.to_string(),
                value: v.clone(),
            })?;
        }
        if let Some(v) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = v;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trials == 0 {
            return Err(ConfigError::Validation("trials must be positive".to_string()));
        }
        let g = &self.grid;
        let bounds = [g.min_x, g.min_y, g.max_x, g.max_y, g.step_x, g.step_y];
        if bounds.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::Validation("grid values must be finite".to_string()));
        }
        if g.step_x < 0.0 || g.step_y < 0.0 {
            return Err(ConfigError::Validation("grid steps must not be negative".to_string()));
        }
        match g.count() {
            Some(n) if n <= MAX_GRID_POINTS => {}
            _ => {
                return Err(ConfigError::Validation(format!(
                    "grid exceeds {MAX_GRID_POINTS} points"
                )))
            }
        }
        Ok(())
    }
}
