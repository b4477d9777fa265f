// Runtime configuration for the planner binaries
// Every section is optional; a missing section falls back to defaults

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::{BuildOptions, ProblemData, SolverBackend};

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration file.
///
/// ```
/// use sourcing_opt::config::SourcingConfig;
/// use std::time::Duration;
///
/// let config = SourcingConfig::from_toml_str(r#"
///     [solver]
///     backend = "highs"
///     time_limit_secs = 30.0
///
///     [model]
///     include_installation_cost = true
/// "#).unwrap();
///
/// assert_eq!(config.solver.time_limit(), Some(Duration::from_secs(30)));
/// assert!(config.model.include_installation_cost);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourcingConfig {
    pub solver: SolverSettings,
    pub model: BuildOptions,
    pub server: ServerSettings,
    pub logging: LoggingSettings,
}

impl SourcingConfig {
    /// Loads and validates configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading configuration");
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.solver.validate()?;
        if let Some(big_m) = self.model.big_m {
            if !(big_m.is_finite() && big_m > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "model.big_m must be positive and finite, got {}",
                    big_m
                )));
            }
        }
        Ok(())
    }
}

/// Backend selection and solve limits.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverSettings {
    pub backend: SolverBackend,
    /// Wall-clock limit per solve, in seconds
    pub time_limit_secs: Option<f64>,
    /// Relative MIP gap; `None` keeps the backend default
    pub gap_tolerance: Option<f64>,
    /// Forward the backend's own log to stdout
    pub verbose: bool,
}

impl SolverSettings {
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_secs
            .and_then(|seconds| Duration::try_from_secs_f64(seconds).ok())
    }

    pub fn with_time_limit_secs(mut self, seconds: f64) -> Self {
        self.time_limit_secs = Some(seconds);
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(limit) = self.time_limit_secs {
            if !(limit > 0.0 && Duration::try_from_secs_f64(limit).is_ok()) {
                return Err(ConfigError::Invalid(format!(
                    "solver.time_limit_secs must be a positive, representable duration, got {}",
                    limit
                )));
            }
        }
        if let Some(gap) = self.gap_tolerance {
            if !(gap.is_finite() && gap >= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "solver.gap_tolerance must be non-negative, got {}",
                    gap
                )));
            }
        }
        Ok(())
    }
}

/// gRPC listener settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSettings {
    pub address: SocketAddr,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            address: SocketAddr::from(([0, 0, 0, 0], 50051)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` takes precedence
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Reads a problem instance from a TOML file. The instance is not validated
/// here; building a program validates it.
pub fn load_problem_data(path: impl AsRef<Path>) -> Result<ProblemData, ConfigError> {
    let path = path.as_ref();
    debug!(path = %path.display(), "Loading problem instance");
    let contents = std::fs::read_to_string(path)?;
    Ok(ProblemData::from_toml_str(&contents)?)
}
