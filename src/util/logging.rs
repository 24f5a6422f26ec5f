//! Structured logging setup
//!
//! Logs always go to stderr so that stdout stays reserved for the payloads the
//! host parses (`detect` JSON, command catalogues, child output).
//!
//! # Example
//!
//! ```no_run
//! use glide_plugin_php::util::logging::{init_logging, LoggingConfig};
//!
//! init_logging(LoggingConfig::default());
//! tracing::info!(root = "/srv/app", "Detecting project");
//! ```

use crate::config::PluginConfig;
use std::io;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Crate target the configured level applies to
const LOG_TARGET: &str = "glide_plugin_php";

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level for this crate's events
    pub level: Level,

    /// One JSON object per line instead of human-readable output
    pub use_json: bool,

    /// Include the module target (e.g. glide_plugin_php::runner) in logs
    pub include_target: bool,

    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: false,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    /// Derive logging settings from the plugin configuration
    pub fn from_plugin_config(config: &PluginConfig) -> Self {
        let level = parse_level(&config.log_level);
        Self {
            level,
            use_json: config.log_json,
            include_target: level >= Level::DEBUG,
            include_location: level >= Level::TRACE,
        }
    }
}

/// Parses a log level from a string
///
/// Case-insensitive. Unknown values fall back to `Level::INFO`.
///
/// ```
/// use glide_plugin_php::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
/// assert_eq!(parse_level("WARN"), Level::WARN);
/// assert_eq!(parse_level("loud"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// `RUST_LOG`, when set, wins outright; otherwise only this crate logs at `level`.
fn build_filter(level: Level) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let filter = EnvFilter::new("warn");
    match format!("{}={}", LOG_TARGET, level).parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}

/// Installs the global subscriber. Only the first call has any effect.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(config.level);

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location),
                )
                .init();
        }
    });
}
