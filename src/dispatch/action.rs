use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A request that is rejected before anything is spawned
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("script name required")]
    MissingScriptName,

    #[error("No testing framework found (PHPUnit or Pest)")]
    NoTestingTool,

    #[error("No static analysis tool found (PHPStan, Psalm, or Larastan)")]
    NoAnalysisTool,

    #[error("Composer scripts are disabled")]
    ScriptsDisabled,

    #[error("Unknown command: {0}")]
    UnknownAction(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Install,
    Run,
    Test,
    Analyze,
}

/// Host-facing description of an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionInfo {
    pub name: &'static str,
    pub usage: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub aliases: &'static [&'static str],
    pub visibility: &'static str,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Install, Action::Run, Action::Test, Action::Analyze];

    pub fn info(&self) -> ActionInfo {
        match self {
            Action::Install => ActionInfo {
                name: "install",
                usage: "install [packages...]",
                description: "Install PHP dependencies with Composer",
                category: "dependencies",
                aliases: &["i"],
                visibility: "project-only",
            },
            Action::Run => ActionInfo {
                name: "run",
                usage: "run <script> [args...]",
                description: "Run a Composer script",
                category: "run",
                aliases: &[],
                visibility: "project-only",
            },
            Action::Test => ActionInfo {
                name: "test",
                usage: "test [args...]",
                description: "Run PHPUnit or Pest tests",
                category: "test",
                aliases: &["t"],
                visibility: "project-only",
            },
            Action::Analyze => ActionInfo {
                name: "analyze",
                usage: "analyze [paths...]",
                description: "Run static analysis tools",
                category: "lint",
                aliases: &["a"],
                visibility: "project-only",
            },
        }
    }

    pub fn name(&self) -> &'static str {
        self.info().name
    }
}

impl FromStr for Action {
    type Err = UsageError;

    /// Looks an action up by name or alias
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| {
                let info = a.info();
                info.name == s || info.aliases.contains(&s)
            })
            .ok_or_else(|| UsageError::UnknownAction(s.to_string()))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
