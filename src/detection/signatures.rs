//! Signature tables and matching
//!
//! Tables are process-wide constants. Matching only ever reads them, so concurrent
//! detections need no synchronization.

use super::result::LabelSet;
use crate::fs::FileSystem;
use crate::manifest::ComposerManifest;
use std::collections::BTreeSet;
use std::path::Path;

/// How a dependency signature is compared against declared package names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    /// Package name must equal the signature
    Exact,
    /// Package name must equal or start with the signature (sub-package variants)
    Prefix,
}

#[derive(Debug, Clone, Copy)]
pub struct DependencySignature {
    pub package: &'static str,
    pub label: &'static str,
    pub rule: MatchRule,
}

impl DependencySignature {
    const fn exact(package: &'static str, label: &'static str) -> Self {
        Self {
            package,
            label,
            rule: MatchRule::Exact,
        }
    }

    const fn prefix(package: &'static str, label: &'static str) -> Self {
        Self {
            package,
            label,
            rule: MatchRule::Prefix,
        }
    }

    pub fn matches(&self, dependencies: &BTreeSet<&str>) -> bool {
        if dependencies.contains(self.package) {
            return true;
        }
        match self.rule {
            MatchRule::Exact => false,
            MatchRule::Prefix => dependencies.iter().any(|d| d.starts_with(self.package)),
        }
    }
}

/// A path, relative to the project root, whose existence identifies a system that
/// does not register as a regular Composer dependency.
#[derive(Debug, Clone, Copy)]
pub struct FileSignature {
    pub path: &'static str,
    pub label: &'static str,
}

impl FileSignature {
    pub fn matches(&self, fs: &dyn FileSystem, project_root: &Path) -> bool {
        let path = self
            .path
            .split('/')
            .fold(project_root.to_path_buf(), |acc, part| acc.join(part));
        fs.exists(&path)
    }
}

pub static FRAMEWORK_DEPENDENCIES: &[DependencySignature] = &[
    DependencySignature::exact("laravel/framework", "Laravel"),
    DependencySignature::exact("symfony/symfony", "Symfony"),
    DependencySignature::exact("symfony/framework-bundle", "Symfony"),
    DependencySignature::exact("cakephp/cakephp", "CakePHP"),
    DependencySignature::exact("yiisoft/yii2", "Yii"),
    DependencySignature::exact("codeigniter4/framework", "CodeIgniter"),
    DependencySignature::exact("slim/slim", "Slim"),
    DependencySignature::exact("laravel/lumen-framework", "Lumen"),
    DependencySignature::exact("laminas/laminas-mvc", "Laminas"),
    DependencySignature::exact("magento/product-community-edition", "Magento"),
];

pub static FRAMEWORK_MARKERS: &[FileSignature] = &[
    FileSignature {
        path: "wp-config.php",
        label: "WordPress",
    },
    FileSignature {
        path: "core/lib/Drupal.php",
        label: "Drupal",
    },
];

pub static TESTING_TOOLS: &[DependencySignature] = &[
    DependencySignature::exact("phpunit/phpunit", "PHPUnit"),
    DependencySignature::exact("pestphp/pest", "Pest"),
    DependencySignature::exact("codeception/codeception", "Codeception"),
    DependencySignature::exact("behat/behat", "Behat"),
    DependencySignature::exact("phpspec/phpspec", "PHPSpec"),
];

// Prefix matching also accepts unrelated packages that share the prefix
// (e.g. "rector/rector-x"); kept as-is.
pub static QUALITY_TOOLS: &[DependencySignature] = &[
    DependencySignature::prefix("phpstan/phpstan", "PHPStan"),
    DependencySignature::prefix("vimeo/psalm", "Psalm"),
    DependencySignature::prefix("friendsofphp/php-cs-fixer", "PHP-CS-Fixer"),
    DependencySignature::prefix("squizlabs/php_codesniffer", "PHPCS"),
    DependencySignature::prefix("phpmd/phpmd", "PHPMD"),
    DependencySignature::prefix("rector/rector", "Rector"),
    DependencySignature::prefix("larastan/larastan", "Larastan"),
];

fn match_table(table: &[DependencySignature], dependencies: &BTreeSet<&str>) -> LabelSet {
    table
        .iter()
        .filter(|sig| sig.matches(dependencies))
        .map(|sig| sig.label.to_string())
        .collect()
}

/// Frameworks from declared dependencies plus marker files under `project_root`.
///
/// Marker checks run regardless of what the manifest declares.
pub fn match_frameworks(
    manifest: &ComposerManifest,
    fs: &dyn FileSystem,
    project_root: &Path,
) -> LabelSet {
    let mut labels = match_table(FRAMEWORK_DEPENDENCIES, &manifest.dependency_names());
    labels.extend(
        FRAMEWORK_MARKERS
            .iter()
            .filter(|sig| sig.matches(fs, project_root))
            .map(|sig| sig.label.to_string()),
    );
    labels
}

pub fn match_testing_tools(manifest: &ComposerManifest) -> LabelSet {
    match_table(TESTING_TOOLS, &manifest.dependency_names())
}

pub fn match_quality_tools(manifest: &ComposerManifest) -> LabelSet {
    match_table(QUALITY_TOOLS, &manifest.dependency_names())
}
