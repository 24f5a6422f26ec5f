//! Shared helpers for integration tests: throwaway PHP project trees.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Path to a checked-in fixture project under `tests/fixtures/php`
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("php")
        .join(name)
}

/// A project tree in a temporary directory, removed on drop.
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn with_composer(self, json: &str) -> Self {
        self.with_file("composer.json", json)
    }

    pub fn with_file(self, relative: &str, content: &str) -> Self {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, content).expect("Failed to write file");
        self
    }

    pub fn with_bytes(self, relative: &str, content: &[u8]) -> Self {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, content).expect("Failed to write file");
        self
    }

    pub fn with_dir(self, relative: &str) -> Self {
        fs::create_dir_all(self.path(relative)).expect("Failed to create dir");
        self
    }

    /// Install an executable shell script at `vendor/bin/<name>`.
    #[cfg(unix)]
    pub fn with_tool(self, name: &str, body: &str) -> Self {
        self.with_script(&format!("vendor/bin/{}", name), body)
    }

    /// Write an executable `#!/bin/sh` script at `relative`.
    #[cfg(unix)]
    pub fn with_script(self, relative: &str, body: &str) -> Self {
        use std::os::unix::fs::PermissionsExt;

        let project = self.with_file(relative, &format!("#!/bin/sh\n{}\n", body));
        let path = project.path(relative);
        let mut perms = fs::metadata(&path).expect("Failed to stat script").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).expect("Failed to chmod script");
        project
    }
}
