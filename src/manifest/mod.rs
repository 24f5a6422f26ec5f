//! Project manifest parsing
//!
//! The only manifest this plugin understands is Composer's `composer.json`.

pub mod composer;

pub use composer::{parse, ComposerManifest, License, ManifestError, ScriptDefinition, MANIFEST_FILE};
