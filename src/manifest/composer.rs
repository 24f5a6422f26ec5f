//! `composer.json` decoding
//!
//! The manifest is read once per call and never cached. A missing file and a file
//! that fails to decode are reported as different [`ManifestError`] variants, since
//! the detector treats the first as "not a PHP project" and the second as a
//! detected project with a parse error.

use crate::fs::FileSystem;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// File name of the manifest, relative to the project root.
pub const MANIFEST_FILE: &str = "composer.json";

/// Name of the platform package carrying the PHP version constraint.
pub const LANGUAGE_PACKAGE: &str = "php";

#[derive(Debug, Error)]
pub enum ManifestError {
    /// No manifest at the expected location
    #[error("Manifest not found: {}", path.display())]
    Absent { path: PathBuf },

    /// Manifest exists but is not well-formed
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Manifest exists but could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The `license` field, which Composer allows as a single identifier or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum License {
    Single(String),
    Multiple(Vec<String>),
}

impl License {
    pub fn identifiers(&self) -> Vec<&str> {
        match self {
            License::Single(id) => vec![id.as_str()],
            License::Multiple(ids) => ids.iter().map(String::as_str).collect(),
        }
    }
}

/// A script entry: one command line or a sequence of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptDefinition {
    Command(String),
    Commands(Vec<String>),
}

impl ScriptDefinition {
    pub fn commands(&self) -> Vec<&str> {
        match self {
            ScriptDefinition::Command(cmd) => vec![cmd.as_str()],
            ScriptDefinition::Commands(cmds) => cmds.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerManifest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    #[serde(rename = "type")]
    pub project_type: Option<String>,
    pub license: Option<License>,

    #[serde(deserialize_with = "null_as_default")]
    pub require: BTreeMap<String, String>,
    #[serde(rename = "require-dev", deserialize_with = "null_as_default")]
    pub require_dev: BTreeMap<String, String>,

    #[serde(deserialize_with = "null_as_default")]
    pub autoload: Map<String, Value>,
    #[serde(rename = "autoload-dev", deserialize_with = "null_as_default")]
    pub autoload_dev: Map<String, Value>,

    #[serde(deserialize_with = "null_as_default")]
    pub scripts: BTreeMap<String, ScriptDefinition>,
    #[serde(deserialize_with = "null_as_default")]
    pub config: Map<String, Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub extra: Map<String, Value>,

    #[serde(rename = "minimum-stability")]
    pub minimum_stability: Option<String>,
    #[serde(rename = "prefer-stable")]
    pub prefer_stable: bool,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ComposerManifest {
    /// Union of runtime and development dependency names.
    pub fn dependency_names(&self) -> BTreeSet<&str> {
        self.require
            .keys()
            .chain(self.require_dev.keys())
            .map(String::as_str)
            .collect()
    }

    /// Version constraint declared for PHP itself, e.g. `^8.2`.
    pub fn language_constraint(&self) -> Option<&str> {
        self.require.get(LANGUAGE_PACKAGE).map(String::as_str)
    }

    pub fn script(&self, name: &str) -> Option<&ScriptDefinition> {
        self.scripts.get(name)
    }
}

/// Read and decode the manifest at `path`.
pub fn parse(fs: &dyn FileSystem, path: &Path) -> Result<ComposerManifest, ManifestError> {
    let content = match fs.read(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No manifest found");
            return Err(ManifestError::Absent {
                path: path.to_path_buf(),
            });
        }
        Err(source) => {
            return Err(ManifestError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_slice(&content).map_err(|source| ManifestError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
