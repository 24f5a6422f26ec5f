//! glide-plugin-php - PHP and Composer integration for Glide
//!
//! Detects PHP projects from `composer.json` and runs Composer, test and
//! static-analysis tooling on the host's behalf.
//!
//! # Core Concepts
//!
//! - **Detection**: parse the manifest, match its dependencies and a few marker
//!   files against signature tables, and report what was found as a
//!   [`DetectionResult`]
//! - **Dispatch**: map a logical action (`install`, `run`, `test`, `analyze`) to
//!   a concrete command line and run it with combined output capture and
//!   cancellation
//! - **Host adapter**: the [`EcosystemPlugin`] trait and the wire shapes the host
//!   exchanges with the plugin
//!
//! # Example Usage
//!
//! ```no_run
//! use glide_plugin_php::{EcosystemDetector, RealFileSystem};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let detector = EcosystemDetector::new(Arc::new(RealFileSystem::new()));
//! if let Some(result) = detector.detect(Path::new("/srv/app")).unwrap() {
//!     println!("frameworks: {:?}", result.frameworks);
//! }
//! ```

pub mod cli;
pub mod config;
pub mod detection;
pub mod dispatch;
pub mod fs;
pub mod host;
pub mod manifest;
pub mod runner;
pub mod tools;
pub mod util;

pub use config::{ConfigError, PluginConfig};
pub use detection::{DetectionError, DetectionResult, EcosystemDetector};
pub use dispatch::{Action, DispatchError, Dispatcher, ExecuteRequest, UsageError};
pub use fs::{FileSystem, MockFileSystem, RealFileSystem};
pub use host::{EcosystemPlugin, HostError, PhpPlugin};
pub use manifest::{ComposerManifest, ManifestError};
pub use runner::{CommandLine, CommandRunner, ExecutionOutcome, RunnerError};
pub use tools::{ToolNotFound, ToolResolver};
pub use util::{init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
