use super::wire::{CommandInfo, CommandRequest, ContextRequest, ContextResponse, ExecuteResponse};
use crate::config::PluginConfig;
use crate::detection::{self, DetectionError, DetectionResult, EcosystemDetector};
use crate::dispatch::{Action, DispatchError, Dispatcher};
use crate::fs::{FileSystem, RealFileSystem};
use crate::runner::RunnerError;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Detection(#[from] DetectionError),

    #[error(transparent)]
    Runner(#[from] RunnerError),
}

/// The surface a host drives a language plugin through
#[async_trait]
pub trait EcosystemPlugin: Send + Sync {
    fn name(&self) -> &str;

    fn commands(&self) -> Vec<CommandInfo>;

    fn detect_context(&self, request: &ContextRequest) -> Result<Option<DetectionResult>, HostError>;

    fn merge_context(
        &self,
        existing: Option<DetectionResult>,
        newer: Option<DetectionResult>,
    ) -> Option<DetectionResult> {
        detection::merge(existing, newer)
    }

    /// Run a command. Usage errors come back as a failed response, not as `Err`.
    async fn execute(
        &self,
        request: &CommandRequest,
        cancel: &CancellationToken,
    ) -> Result<ExecuteResponse, HostError>;

    fn context_response(&self, request: &ContextRequest) -> Result<ContextResponse, HostError> {
        let result = self.detect_context(request)?;
        Ok(ContextResponse::from(result.as_ref()))
    }
}

pub struct PhpPlugin {
    detector: EcosystemDetector,
    dispatcher: Dispatcher,
}

impl PhpPlugin {
    pub fn new(config: &PluginConfig, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            detector: EcosystemDetector::new(fs.clone()).with_vendor_dir(config.vendor_dir.clone()),
            dispatcher: Dispatcher::new(config, fs),
        }
    }

    pub fn from_config(config: &PluginConfig) -> Self {
        Self::new(config, Arc::new(RealFileSystem::new()))
    }
}

#[async_trait]
impl EcosystemPlugin for PhpPlugin {
    fn name(&self) -> &str {
        self.detector.name()
    }

    fn commands(&self) -> Vec<CommandInfo> {
        Action::ALL.iter().map(|a| CommandInfo::from(a.info())).collect()
    }

    fn detect_context(&self, request: &ContextRequest) -> Result<Option<DetectionResult>, HostError> {
        Ok(self.detector.detect(request.root())?)
    }

    async fn execute(
        &self,
        request: &CommandRequest,
        cancel: &CancellationToken,
    ) -> Result<ExecuteResponse, HostError> {
        let execute_request = match request.to_execute_request() {
            Ok(r) => r,
            Err(err) => {
                warn!(command = %request.command, "{}", err);
                return Ok(ExecuteResponse::from(err));
            }
        };

        match self
            .dispatcher
            .execute(&request.project_root, &execute_request, cancel)
            .await
        {
            Ok(outcome) => {
                info!(
                    action = %execute_request.action,
                    exit_code = ?outcome.exit_code(),
                    cancelled = outcome.is_cancelled(),
                    "Command finished"
                );
                Ok(ExecuteResponse::from(outcome))
            }
            Err(DispatchError::Usage(err)) => {
                warn!(action = %execute_request.action, "{}", err);
                Ok(ExecuteResponse::from(err))
            }
            Err(DispatchError::Runner(err)) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use crate::host::USAGE_EXIT_CODE;

    fn plugin(fs: MockFileSystem) -> PhpPlugin {
        PhpPlugin::new(&PluginConfig::defaults(), Arc::new(fs))
    }

    #[test]
    fn test_plugin_name() {
        assert_eq!(plugin(MockFileSystem::new()).name(), "php");
    }

    #[test]
    fn test_commands_catalogue() {
        let commands = plugin(MockFileSystem::new()).commands();
        let names: Vec<&str> = commands.iter().map(|c| c.name.as_str()).collect();

        assert_eq!(names, vec!["install", "run", "test", "analyze"]);
        assert!(commands.iter().all(|c| c.visibility == "project-only"));
        assert_eq!(commands[0].aliases, vec!["i"]);
    }

    #[test]
    fn test_detect_context_absent() {
        let response = plugin(MockFileSystem::new())
            .context_response(&ContextRequest::new("/mock"))
            .unwrap();
        assert!(!response.detected);
    }

    #[test]
    fn test_detect_context_laravel() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "composer.json",
            r#"{"name": "acme/shop", "require": {"php": "^8.2", "laravel/framework": "^11.0"}}"#,
        );

        let response = plugin(fs)
            .context_response(&ContextRequest::new("/mock"))
            .unwrap();
        assert!(response.detected);
        assert_eq!(response.version.as_deref(), Some("^8.2"));
        assert_eq!(response.frameworks, vec!["Laravel"]);
    }

    #[test]
    fn test_detect_context_unreadable_manifest() {
        let fs = MockFileSystem::new();
        fs.add_unreadable("composer.json");

        let err = plugin(fs)
            .detect_context(&ContextRequest::new("/mock"))
            .unwrap_err();
        assert!(matches!(err, HostError::Detection(_)));
    }

    #[tokio::test]
    async fn test_execute_unknown_command() {
        let response = plugin(MockFileSystem::new())
            .execute(
                &CommandRequest::new("deploy", "/mock"),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert!(!response.success);
        assert_eq!(response.exit_code, Some(USAGE_EXIT_CODE));
        assert_eq!(response.error.as_deref(), Some("Unknown command: deploy"));
    }

    #[tokio::test]
    async fn test_execute_test_without_tool() {
        let response = plugin(MockFileSystem::new())
            .execute(&CommandRequest::new("test", "/mock"), &CancellationToken::new())
            .await
            .unwrap();

        assert!(!response.success);
        assert_eq!(
            response.error.as_deref(),
            Some("No testing framework found (PHPUnit or Pest)")
        );
    }

    #[tokio::test]
    async fn test_execute_run_without_script_name() {
        let response = plugin(MockFileSystem::new())
            .execute(&CommandRequest::new("run", "/mock"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(response.error.as_deref(), Some("script name required"));
    }

    #[test]
    fn test_merge_context_default() {
        let plugin = plugin(MockFileSystem::new());
        let newer = DetectionResult {
            detected: true,
            ..Default::default()
        };
        assert_eq!(plugin.merge_context(None, Some(newer.clone())), Some(newer));
    }
}
