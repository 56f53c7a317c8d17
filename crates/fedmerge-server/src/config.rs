//! Configuration management for the fedmerge gateway components.
//!
//! This module provides configuration loading with multiple sources:
//! 1. Default values (hardcoded)
//! 2. Configuration file (YAML)
//! 3. Environment variables (override)
//!
//! # Configuration Hierarchy
//!
//! Environment variables take precedence over config file values,
//! which take precedence over defaults.
//!
//! # Example
//!
//! ```ignore
//! use fedmerge_server::config::GatewayConfig;
//!
//! // Load from file with env overrides
//! let config = GatewayConfig::load("fedmerge.yaml")?;
//!
//! // Or load from environment only
//! let config = GatewayConfig::from_env()?;
//! ```

use config::{Config, ConfigError, Environment, File, FileFormat};
use fedmerge_core::MergerConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Upper bound for `merger.prewarm_hashers`.
pub const MAX_PREWARM_HASHERS: usize = 4096;

/// Gateway configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct GatewayConfig {
    /// Batch merger settings
    #[serde(default)]
    pub merger: MergerSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Metrics settings
    #[serde(default)]
    pub metrics: MetricsSettings,
}

/// Batch merger settings.
///
/// These settings can be overridden via environment variables with the
/// `FEDMERGE_` prefix and `__` as the nested key separator:
///
/// - `FEDMERGE_MERGER__VERIFY_COLLISIONS=false` - Trust fingerprints without byte comparison
/// - `FEDMERGE_MERGER__PREWARM_HASHERS=16` - Allocate idle hashers at startup
/// - `FEDMERGE_MERGER__HASH_SEED=7` - Change the XXH64 seed
///
/// # Example YAML Configuration
///
/// ```yaml
/// merger:
///   verify_collisions: true
///   prewarm_hashers: 16
///   hash_seed: 0
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MergerSettings {
    /// Compare payload bytes whenever two fingerprints match.
    ///
    /// Disabling this accepts a 2^-64 per-pair chance of merging two
    /// unrelated representation arrays.
    #[serde(default = "default_true")]
    pub verify_collisions: bool,

    /// Idle hashers allocated when the merger is built.
    #[serde(default)]
    pub prewarm_hashers: usize,

    /// Seed for the XXH64 fingerprint.
    #[serde(default)]
    pub hash_seed: u64,
}

impl Default for MergerSettings {
    fn default() -> Self {
        Self {
            verify_collisions: true,
            prewarm_hashers: 0,
            hash_seed: 0,
        }
    }
}

impl MergerSettings {
    /// Converts these settings into the engine's configuration.
    pub fn to_merger_config(&self) -> MergerConfig {
        MergerConfig {
            verify_collisions: self.verify_collisions,
            prewarm_hashers: self.prewarm_hashers,
            hash_seed: self.hash_seed,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Use JSON format (true for production, false for development)
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Metrics settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MetricsSettings {
    /// Install the Prometheus recorder
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_true() -> bool {
    true
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

impl GatewayConfig {
    /// Load configuration from a YAML file with environment variable overrides.
    ///
    /// Environment variables are prefixed with `FEDMERGE_` and use `__` as separator.
    /// For example:
    /// - `FEDMERGE_LOGGING__LEVEL=debug` overrides `logging.level`
    /// - `FEDMERGE_MERGER__PREWARM_HASHERS=32` overrides `merger.prewarm_hashers`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigLoadError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let config = Config::builder()
            .add_source(Config::try_from(&GatewayConfig::default())?)
            .add_source(File::from(path).format(FileFormat::Yaml))
            // FEDMERGE_MERGER__HASH_SEED -> merger.hash_seed
            .add_source(
                Environment::with_prefix("FEDMERGE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let gateway_config: GatewayConfig = config.try_deserialize()?;
        gateway_config.validate()?;

        Ok(gateway_config)
    }

    /// Load configuration from environment variables only.
    ///
    /// Uses default values and allows overrides via FEDMERGE_ prefixed env vars.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        let config = Config::builder()
            .add_source(Config::try_from(&GatewayConfig::default())?)
            .add_source(
                Environment::with_prefix("FEDMERGE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let gateway_config: GatewayConfig = config.try_deserialize()?;
        gateway_config.validate()?;

        Ok(gateway_config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.merger.prewarm_hashers > MAX_PREWARM_HASHERS {
            return Err(ConfigLoadError::Invalid {
                message: format!(
                    "merger.prewarm_hashers must be at most {MAX_PREWARM_HASHERS}, got: {}",
                    self.merger.prewarm_hashers
                ),
            });
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigLoadError::Invalid {
                message: format!(
                    "logging.level must be one of: {:?}, got: {}",
                    valid_levels, self.logging.level
                ),
            });
        }

        Ok(())
    }
}
