//! Tool candidate lists
//!
//! Order is priority: the first installed candidate wins.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestTool {
    Pest,
    PhpUnit,
}

/// Priority order for the `test` action
pub const TEST_CANDIDATES: &[TestTool] = &[TestTool::Pest, TestTool::PhpUnit];

impl TestTool {
    pub fn binary(&self) -> &'static str {
        match self {
            TestTool::Pest => "pest",
            TestTool::PhpUnit => "phpunit",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TestTool::Pest => "Pest",
            TestTool::PhpUnit => "PHPUnit",
        }
    }

    pub fn from_binary(binary: &str) -> Option<Self> {
        TEST_CANDIDATES.iter().copied().find(|t| t.binary() == binary)
    }
}

impl fmt::Display for TestTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Static analysis tools. Larastan ships no binary of its own and runs through
/// PHPStan's, so it is told apart from plain PHPStan by its package directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisTool {
    Larastan,
    PhpStan,
    Psalm,
}

/// Binary priority order for the `analyze` action
pub const ANALYSIS_CANDIDATES: &[&str] = &["phpstan", "psalm"];

/// Package directories, relative to the vendor dir, whose presence selects Larastan
pub const LARASTAN_PACKAGE_DIRS: &[&str] = &["nunomaduro/larastan", "larastan/larastan"];

impl AnalysisTool {
    pub fn binary(&self) -> &'static str {
        match self {
            AnalysisTool::Larastan | AnalysisTool::PhpStan => "phpstan",
            AnalysisTool::Psalm => "psalm",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AnalysisTool::Larastan => "Larastan",
            AnalysisTool::PhpStan => "PHPStan",
            AnalysisTool::Psalm => "Psalm",
        }
    }

    /// Fixed tokens placed between the binary and the caller's arguments
    pub fn sub_command(&self) -> &'static [&'static str] {
        match self {
            AnalysisTool::Larastan | AnalysisTool::PhpStan => &["analyse"],
            AnalysisTool::Psalm => &[],
        }
    }
}

impl fmt::Display for AnalysisTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
