//! Dispatch façade
//!
//! One request resolves to at most one subprocess. Every rejection ([`UsageError`])
//! happens while planning, before anything is spawned.

use super::action::{Action, UsageError};
use crate::config::PluginConfig;
use crate::fs::{FileSystem, RealFileSystem};
use crate::runner::{CommandLine, CommandRunner, ExecutionOutcome, RunnerError};
use crate::tools::ToolResolver;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Token separating a script name from the arguments forwarded to it
const SCRIPT_ARGS_SEPARATOR: &str = "--";

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error(transparent)]
    Runner(#[from] RunnerError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteRequest {
    pub action: Action,
    pub args: Vec<String>,
    /// Defaults to the project root when unset or empty; relative paths are
    /// taken relative to the project root.
    pub working_dir: Option<PathBuf>,
    pub env: HashMap<String, String>,
}

impl ExecuteRequest {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            args: Vec::new(),
            working_dir: None,
            env: HashMap::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn working_dir_in(&self, project_root: &Path) -> PathBuf {
        match &self.working_dir {
            Some(dir) if !dir.as_os_str().is_empty() => project_root.join(dir),
            _ => project_root.to_path_buf(),
        }
    }
}

pub struct Dispatcher {
    resolver: ToolResolver,
    runner: CommandRunner,
    composer_bin: String,
    composer_scripts: bool,
}

impl Dispatcher {
    pub fn new(config: &PluginConfig, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            resolver: ToolResolver::new(fs).with_vendor_dir(config.vendor_dir.clone()),
            runner: CommandRunner::new(),
            composer_bin: config.composer_bin.clone(),
            composer_scripts: config.composer_scripts,
        }
    }

    pub fn from_config(config: &PluginConfig) -> Self {
        Self::new(config, Arc::new(RealFileSystem::new()))
    }

    /// Decide what to run for `request` without running it.
    pub fn plan(
        &self,
        project_root: &Path,
        request: &ExecuteRequest,
    ) -> Result<CommandLine, UsageError> {
        let args = &request.args;

        let command = match request.action {
            Action::Install if args.is_empty() => {
                CommandLine::new(&self.composer_bin).arg("install")
            }
            Action::Install => CommandLine::new(&self.composer_bin)
                .arg("require")
                .args(args.iter().cloned()),
            Action::Run => {
                if !self.composer_scripts {
                    return Err(UsageError::ScriptsDisabled);
                }
                let (script, rest) = args.split_first().ok_or(UsageError::MissingScriptName)?;
                // A caller-supplied separator would otherwise reach the script as an argument.
                let rest = match rest.split_first() {
                    Some((first, tail)) if first == SCRIPT_ARGS_SEPARATOR => tail,
                    _ => rest,
                };
                CommandLine::new(&self.composer_bin)
                    .arg("run-script")
                    .arg(script.clone())
                    .arg(SCRIPT_ARGS_SEPARATOR)
                    .args(rest.iter().cloned())
            }
            Action::Test => {
                let found = self
                    .resolver
                    .resolve_test_tool(project_root)
                    .map_err(|_| UsageError::NoTestingTool)?;
                info!(tool = %found.tool, "Running tests");
                CommandLine::new(found.path).args(args.iter().cloned())
            }
            Action::Analyze => {
                let found = self
                    .resolver
                    .resolve_analysis_tool(project_root)
                    .map_err(|_| UsageError::NoAnalysisTool)?;
                info!(tool = %found.tool, "Running static analysis");
                CommandLine::new(found.path)
                    .args(found.tool.sub_command().iter().copied())
                    .args(args.iter().cloned())
            }
        };

        debug!(action = %request.action, command = %command, "Planned command");
        Ok(command)
    }

    /// Plan and run `request`, waiting for the child or `cancel`.
    pub async fn execute(
        &self,
        project_root: &Path,
        request: &ExecuteRequest,
        cancel: &CancellationToken,
    ) -> Result<ExecutionOutcome, DispatchError> {
        let command = self.plan(project_root, request)?;
        let working_dir = request.working_dir_in(project_root);

        let outcome = self
            .runner
            .run(&command, &working_dir, &request.env, cancel)
            .await?;
        Ok(outcome)
    }
}
