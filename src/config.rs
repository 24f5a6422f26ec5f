//! Configuration management for the PHP plugin
//!
//! Settings are loaded from environment variables with sensible defaults.
//!
//! # Environment Variables
//!
//! - `GLIDE_PHP_COMPOSER_BIN`: Composer executable - default: "composer"
//! - `GLIDE_PHP_VENDOR_DIR`: Dependency installation directory, relative to the
//!   project root - default: "vendor"
//! - `GLIDE_PHP_COMPOSER_SCRIPTS`: Allow `run` to invoke Composer scripts
//!   (true|false) - default: "true"
//! - `GLIDE_PHP_LOG_LEVEL`: Logging level - default: "info"
//! - `GLIDE_PHP_LOG_JSON`: JSON log output (true|false) - default: "false"
//!
//! # Example
//!
//! ```no_run
//! use glide_plugin_php::PluginConfig;
//!
//! let config = PluginConfig::default();
//! config.validate().expect("Invalid configuration");
//! ```

use std::env;
use std::fmt;
use std::path::{Component, Path};
use thiserror::Error;

const DEFAULT_COMPOSER_BIN: &str = "composer";
const DEFAULT_VENDOR_DIR: &str = crate::detection::detector::DEFAULT_VENDOR_DIR;
const DEFAULT_COMPOSER_SCRIPTS: bool = true;
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_LOG_JSON: bool = false;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginConfig {
    /// Composer executable, looked up on PATH unless it contains a separator
    pub composer_bin: String,

    /// Dependency installation directory relative to the project root
    pub vendor_dir: String,

    /// Whether `run` may invoke Composer scripts
    pub composer_scripts: bool,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Emit logs as JSON
    pub log_json: bool,
}

impl Default for PluginConfig {
    /// Loads from `GLIDE_PHP_*` environment variables. Unset variables take their
    /// default; if any value fails to parse, the built-in defaults are used.
    fn default() -> Self {
        Self::from_env().unwrap_or_else(|_| Self::defaults())
    }
}

impl PluginConfig {
    /// Built-in defaults, ignoring the environment
    pub fn defaults() -> Self {
        Self {
            composer_bin: DEFAULT_COMPOSER_BIN.to_string(),
            vendor_dir: DEFAULT_VENDOR_DIR.to_string(),
            composer_scripts: DEFAULT_COMPOSER_SCRIPTS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_json: DEFAULT_LOG_JSON,
        }
    }

    /// Loads from the environment, rejecting boolean values that do not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let composer_bin =
            env::var("GLIDE_PHP_COMPOSER_BIN").unwrap_or_else(|_| DEFAULT_COMPOSER_BIN.to_string());

        let vendor_dir =
            env::var("GLIDE_PHP_VENDOR_DIR").unwrap_or_else(|_| DEFAULT_VENDOR_DIR.to_string());

        let composer_scripts =
            parse_bool_var("GLIDE_PHP_COMPOSER_SCRIPTS", DEFAULT_COMPOSER_SCRIPTS)?;

        let log_level = env::var("GLIDE_PHP_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let log_json = parse_bool_var("GLIDE_PHP_LOG_JSON", DEFAULT_LOG_JSON)?;

        Ok(Self {
            composer_bin,
            vendor_dir,
            composer_scripts,
            log_level,
            log_json,
        })
    }

    /// Validates the configuration
    ///
    /// Checks that:
    /// - the Composer executable is non-empty
    /// - the vendor dir is a relative path that stays inside the project root
    /// - the log level is valid
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.composer_bin.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Composer executable must not be empty".to_string(),
            ));
        }

        let vendor = Path::new(&self.vendor_dir);
        if self.vendor_dir.is_empty()
            || vendor.is_absolute()
            || vendor.components().any(|c| matches!(c, Component::ParentDir))
        {
            return Err(ConfigError::ValidationFailed(format!(
                "Vendor dir must be a relative path inside the project: {}",
                self.vendor_dir
            )));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }
}

fn parse_bool_var(key: &str, default: bool) -> Result<bool, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .to_lowercase()
            .parse::<bool>()
            .map_err(|_| ConfigError::InvalidValue {
                field: key.to_string(),
                value,
            }),
        Err(_) => Ok(default),
    }
}

impl fmt::Display for PluginConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PHP Plugin Configuration:")?;
        writeln!(f, "  Composer: {}", self.composer_bin)?;
        writeln!(f, "  Vendor Dir: {}", self.vendor_dir)?;
        writeln!(f, "  Composer Scripts: {}", self.composer_scripts)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        writeln!(f, "  Log JSON: {}", self.log_json)?;
        Ok(())
    }
}
