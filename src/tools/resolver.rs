//! Tool resolver
//!
//! Checks `<root>/<vendor>/bin/<name>` for each candidate in order. Nothing is
//! executed here.

use super::candidates::{
    AnalysisTool, TestTool, ANALYSIS_CANDIDATES, LARASTAN_PACKAGE_DIRS, TEST_CANDIDATES,
};
use crate::detection::detector::DEFAULT_VENDOR_DIR;
use crate::fs::{FileSystem, RealFileSystem};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// None of the candidates is installed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("None of [{}] found under {}", candidates.join(", "), bin_dir.display())]
pub struct ToolNotFound {
    pub candidates: Vec<String>,
    pub bin_dir: PathBuf,
}

/// A candidate that was found, with the path to its binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    pub tool: T,
    pub path: PathBuf,
}

pub struct ToolResolver {
    fs: Arc<dyn FileSystem>,
    vendor_dir: String,
}

impl ToolResolver {
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

    pub fn bin_dir(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.vendor_dir).join("bin")
    }

    /// First candidate whose binary exists, in list order.
    pub fn resolve(
        &self,
        project_root: &Path,
        candidates: &[&str],
    ) -> Result<Resolved<String>, ToolNotFound> {
        let bin_dir = self.bin_dir(project_root);

        for name in candidates {
            let path = bin_dir.join(name);
            if self.fs.exists(&path) {
                debug!(tool = name, path = %path.display(), "Resolved tool");
                return Ok(Resolved {
                    tool: name.to_string(),
                    path,
                });
            }
            debug!(tool = name, "Tool not installed");
        }

        Err(ToolNotFound {
            candidates: candidates.iter().map(|c| c.to_string()).collect(),
            bin_dir,
        })
    }

    pub fn resolve_test_tool(&self, project_root: &Path) -> Result<Resolved<TestTool>, ToolNotFound> {
        let names: Vec<&str> = TEST_CANDIDATES.iter().map(TestTool::binary).collect();
        let found = self.resolve(project_root, &names)?;

        let tool = TestTool::from_binary(&found.tool).ok_or_else(|| ToolNotFound {
            candidates: vec![found.tool.clone()],
            bin_dir: self.bin_dir(project_root),
        })?;

        Ok(Resolved {
            tool,
            path: found.path,
        })
    }

    /// PHPStan before Psalm; a PHPStan binary counts as Larastan when a Larastan
    /// package directory is installed next to it.
    pub fn resolve_analysis_tool(
        &self,
        project_root: &Path,
    ) -> Result<Resolved<AnalysisTool>, ToolNotFound> {
        let found = self.resolve(project_root, ANALYSIS_CANDIDATES)?;

        let tool = if found.tool == AnalysisTool::Psalm.binary() {
            AnalysisTool::Psalm
        } else if self.has_larastan(project_root) {
            AnalysisTool::Larastan
        } else {
            AnalysisTool::PhpStan
        };

        Ok(Resolved {
            tool,
            path: found.path,
        })
    }

    fn has_larastan(&self, project_root: &Path) -> bool {
        let vendor = project_root.join(&self.vendor_dir);
        LARASTAN_PACKAGE_DIRS
            .iter()
            .any(|dir| self.fs.is_dir(&vendor.join(dir)))
    }
}

impl Default for ToolResolver {
    fn default() -> Self {
        Self::new(Arc::new(RealFileSystem::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    fn resolver(fs: MockFileSystem) -> ToolResolver {
        ToolResolver::new(Arc::new(fs))
    }

    #[test]
    fn test_first_candidate_wins() {
        let fs = MockFileSystem::new();
        fs.add_file("vendor/bin/pest", "");
        fs.add_file("vendor/bin/phpunit", "");

        let found = resolver(fs).resolve_test_tool(Path::new("/mock")).unwrap();
        assert_eq!(found.tool, TestTool::Pest);
        assert_eq!(found.path, PathBuf::from("/mock/vendor/bin/pest"));
    }

    #[test]
    fn test_falls_back_to_later_candidate() {
        let fs = MockFileSystem::new();
        fs.add_file("vendor/bin/phpunit", "");

        let found = resolver(fs).resolve_test_tool(Path::new("/mock")).unwrap();
        assert_eq!(found.tool, TestTool::PhpUnit);
    }

    #[test]
    fn test_not_found_lists_candidates() {
        let err = resolver(MockFileSystem::new())
            .resolve(Path::new("/mock"), &["pest", "phpunit"])
            .unwrap_err();

        assert_eq!(err.candidates, vec!["pest", "phpunit"]);
        assert_eq!(err.bin_dir, PathBuf::from("/mock/vendor/bin"));
    }

    #[test]
    fn test_larastan_tie_break() {
        let fs = MockFileSystem::new();
        fs.add_file("vendor/bin/phpstan", "");
        fs.add_dir("vendor/nunomaduro/larastan");

        let found = resolver(fs).resolve_analysis_tool(Path::new("/mock")).unwrap();
        assert_eq!(found.tool, AnalysisTool::Larastan);
        assert_eq!(found.path, PathBuf::from("/mock/vendor/bin/phpstan"));
    }

    #[test]
    fn test_plain_phpstan_without_larastan_dir() {
        let fs = MockFileSystem::new();
        fs.add_file("vendor/bin/phpstan", "");
        fs.add_file("vendor/bin/psalm", "");

        let found = resolver(fs).resolve_analysis_tool(Path::new("/mock")).unwrap();
        assert_eq!(found.tool, AnalysisTool::PhpStan);
    }

    #[test]
    fn test_larastan_dir_without_phpstan_binary_picks_psalm() {
        let fs = MockFileSystem::new();
        fs.add_file("vendor/bin/psalm", "");
        fs.add_dir("vendor/nunomaduro/larastan");

        let found = resolver(fs).resolve_analysis_tool(Path::new("/mock")).unwrap();
        assert_eq!(found.tool, AnalysisTool::Psalm);
    }

    #[test]
    fn test_no_analysis_tool() {
        let fs = MockFileSystem::new();
        fs.add_dir("vendor/nunomaduro/larastan");

        assert!(resolver(fs).resolve_analysis_tool(Path::new("/mock")).is_err());
    }
}
