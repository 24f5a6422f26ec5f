//! Ecosystem detector
//!
//! Builds a [`DetectionResult`] from `composer.json` and a handful of filesystem
//! checks. Detection is read-only and holds no state between calls.

use super::result::{self, DetectionResult};
use super::signatures::{match_frameworks, match_quality_tools, match_testing_tools};
use crate::fs::{FileSystem, RealFileSystem};
use crate::manifest::{self, ComposerManifest, ManifestError, MANIFEST_FILE};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default dependency installation directory
pub const DEFAULT_VENDOR_DIR: &str = "vendor";

/// Failures that are neither absence nor malformed content
#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("Failed to read manifest {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub struct EcosystemDetector {
    fs: Arc<dyn FileSystem>,
    vendor_dir: String,
}

impl EcosystemDetector {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            vendor_dir: DEFAULT_VENDOR_DIR.to_string(),
        }
    }

    pub fn with_vendor_dir(mut self, vendor_dir: impl Into<String>) -> Self {
        self.vendor_dir = vendor_dir.into();
        self
    }

    /// Unique identifier of the ecosystem this detector handles
    pub fn name(&self) -> &str {
        "php"
    }

    /// Detect a PHP project rooted at `project_root`.
    ///
    /// Returns `Ok(None)` when there is no manifest. A manifest that fails to decode
    /// still counts as detected, with only `parse_error` populated.
    pub fn detect(&self, project_root: &Path) -> Result<Option<DetectionResult>, DetectionError> {
        let manifest_path = project_root.join(MANIFEST_FILE);

        let manifest = match manifest::parse(self.fs.as_ref(), &manifest_path) {
            Ok(manifest) => manifest,
            Err(ManifestError::Absent { .. }) => {
                debug!(root = %project_root.display(), "Not a PHP project");
                return Ok(None);
            }
            Err(ManifestError::Parse { source, .. }) => {
                warn!(path = %manifest_path.display(), error = %source, "Manifest is malformed");
                return Ok(Some(DetectionResult::parse_failure(format!(
                    "failed to parse {}: {}",
                    MANIFEST_FILE, source
                ))));
            }
            Err(ManifestError::Io { path, source }) => {
                return Err(DetectionError::Io { path, source });
            }
        };

        let result = self.build_result(&manifest, project_root);
        info!(
            root = %project_root.display(),
            frameworks = ?result.frameworks,
            testing_tools = ?result.testing_tools,
            quality_tools = ?result.quality_tools,
            dependencies_installed = result.dependencies_installed,
            "PHP project detected"
        );

        Ok(Some(result))
    }

    /// Right-biased merge of a prior result with a newer one.
    pub fn merge(
        &self,
        existing: Option<DetectionResult>,
        newer: Option<DetectionResult>,
    ) -> Option<DetectionResult> {
        result::merge(existing, newer)
    }

    fn build_result(&self, manifest: &ComposerManifest, project_root: &Path) -> DetectionResult {
        let vendor_path = project_root.join(&self.vendor_dir);

        DetectionResult {
            detected: true,
            project_name: non_empty(&manifest.name),
            description: non_empty(&manifest.description),
            declared_version: non_empty(&manifest.version),
            project_type: non_empty(&manifest.project_type),
            language_version_constraint: manifest.language_constraint().map(str::to_string),
            frameworks: match_frameworks(manifest, self.fs.as_ref(), project_root),
            testing_tools: match_testing_tools(manifest),
            quality_tools: match_quality_tools(manifest),
            dependencies_installed: self.fs.is_dir(&vendor_path),
            parse_error: None,
        }
    }
}

impl Default for EcosystemDetector {
    fn default() -> Self {
        Self::new(Arc::new(RealFileSystem::new()))
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|s| !s.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    fn detector_with(fs: MockFileSystem) -> EcosystemDetector {
        EcosystemDetector::new(Arc::new(fs))
    }

    #[test]
    fn test_absent_manifest() {
        let detector = detector_with(MockFileSystem::new());
        assert_eq!(detector.detect(Path::new("/mock")).unwrap(), None);
    }

    #[test]
    fn test_malformed_manifest() {
        let fs = MockFileSystem::new();
        fs.add_file("composer.json", "{\"name\": ");
        fs.add_dir("vendor");
        fs.add_file("wp-config.php", "<?php");

        let result = detector_with(fs).detect(Path::new("/mock")).unwrap().unwrap();
        assert!(result.detected);
        assert!(result.is_parse_failure());
        assert_eq!(
            result,
            DetectionResult::parse_failure(result.parse_error.clone().unwrap())
        );
    }

    #[test]
    fn test_non_utf8_manifest_is_parse_failure() {
        let fs = MockFileSystem::new();
        fs.add_bytes("composer.json", b"{\"description\": \"caf\xe9\"}");

        let result = detector_with(fs).detect(Path::new("/mock")).unwrap().unwrap();
        assert!(result.is_parse_failure());
    }

    #[test]
    fn test_unreadable_manifest_is_hard_error() {
        let fs = MockFileSystem::new();
        fs.add_unreadable("composer.json");

        let err = detector_with(fs).detect(Path::new("/mock")).unwrap_err();
        assert!(matches!(err, DetectionError::Io { .. }));
    }

    #[test]
    fn test_identity_fields() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "composer.json",
            r#"{
                "name": "acme/shop",
                "description": "",
                "version": "1.2.0",
                "type": "project",
                "require": {"php": ">=8.1"}
            }"#,
        );

        let result = detector_with(fs).detect(Path::new("/mock")).unwrap().unwrap();
        assert_eq!(result.project_name.as_deref(), Some("acme/shop"));
        assert_eq!(result.description, None);
        assert_eq!(result.declared_version.as_deref(), Some("1.2.0"));
        assert_eq!(result.project_type.as_deref(), Some("project"));
        assert_eq!(result.language_version_constraint.as_deref(), Some(">=8.1"));
        assert!(!result.dependencies_installed);
    }

    #[test]
    fn test_vendor_must_be_directory() {
        let fs = MockFileSystem::new();
        fs.add_file("composer.json", "{}");
        fs.add_file("vendor", "not a directory");

        let result = detector_with(fs).detect(Path::new("/mock")).unwrap().unwrap();
        assert!(!result.dependencies_installed);
    }

    #[test]
    fn test_custom_vendor_dir() {
        let fs = MockFileSystem::new();
        fs.add_file("composer.json", "{}");
        fs.add_dir("lib/vendor");

        let detector = detector_with(fs).with_vendor_dir("lib/vendor");
        let result = detector.detect(Path::new("/mock")).unwrap().unwrap();
        assert!(result.dependencies_installed);
    }

    #[test]
    fn test_php_constraint_only_from_runtime_dependencies() {
        let fs = MockFileSystem::new();
        fs.add_file("composer.json", r#"{"require-dev": {"php": "^8.3"}}"#);

        let result = detector_with(fs).detect(Path::new("/mock")).unwrap().unwrap();
        assert_eq!(result.language_version_constraint, None);
    }

    #[test]
    fn test_name_is_php() {
        assert_eq!(EcosystemDetector::default().name(), "php");
    }
}
