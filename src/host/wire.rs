//! Wire shapes exchanged with the host

use crate::detection::DetectionResult;
use crate::dispatch::{Action, ActionInfo, ExecuteRequest, UsageError};
use crate::runner::ExecutionOutcome;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// Status reported for requests rejected before spawning
pub const USAGE_EXIT_CODE: i32 = 1;

/// Extension name the host registers this plugin under
pub const EXTENSION_NAME: &str = "php";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextRequest {
    #[serde(default)]
    pub project_root: PathBuf,
    #[serde(default)]
    pub working_dir: PathBuf,
}

impl ContextRequest {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            working_dir: PathBuf::new(),
        }
    }

    /// The project root, or the working dir when no root was given
    pub fn root(&self) -> &std::path::Path {
        if self.project_root.as_os_str().is_empty() {
            &self.working_dir
        } else {
            &self.project_root
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextResponse {
    pub extension_name: String,
    pub detected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frameworks: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<String>,
}

impl ContextResponse {
    pub fn not_detected() -> Self {
        Self {
            extension_name: EXTENSION_NAME.to_string(),
            detected: false,
            version: None,
            metadata: BTreeMap::new(),
            frameworks: Vec::new(),
            tools: Vec::new(),
        }
    }
}

impl From<Option<&DetectionResult>> for ContextResponse {
    fn from(result: Option<&DetectionResult>) -> Self {
        let Some(result) = result.filter(|r| r.detected) else {
            return Self::not_detected();
        };

        let mut metadata = BTreeMap::new();
        let scalars = [
            ("project_name", &result.project_name),
            ("description", &result.description),
            ("version", &result.declared_version),
            ("project_type", &result.project_type),
            ("php_version", &result.language_version_constraint),
            ("error", &result.parse_error),
        ];
        for (key, value) in scalars {
            if let Some(value) = value {
                metadata.insert(key.to_string(), value.clone());
            }
        }

        Self {
            extension_name: EXTENSION_NAME.to_string(),
            detected: true,
            version: result.language_version_constraint.clone(),
            metadata,
            frameworks: result.frameworks.iter().cloned().collect(),
            tools: result.tools().map(str::to_string).collect(),
        }
    }
}

/// A command invocation as the host sends it, before the action name is resolved
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRequest {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub project_root: PathBuf,
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl CommandRequest {
    pub fn new(command: impl Into<String>, project_root: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            project_root: project_root.into(),
            ..Default::default()
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

    /// Resolve the command name or alias into a dispatchable request.
    pub fn to_execute_request(&self) -> Result<ExecuteRequest, UsageError> {
        let action: Action = self.command.parse()?;
        Ok(ExecuteRequest {
            action,
            args: self.args.clone(),
            working_dir: self.working_dir.clone(),
            env: self.env.clone(),
        })
    }
}

/// Value of `output_encoding` when `output` carries base64 instead of text
pub const BASE64_OUTPUT_ENCODING: &str = "base64";

/// Outcome of an execute request.
///
/// `output` serializes as text when the child wrote valid UTF-8. Any other bytes
/// are sent base64-encoded alongside `"output_encoding": "base64"`, so the host
/// always gets the exact bytes back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteResponse {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub output: Vec<u8>,
    pub error: Option<String>,
    pub cancelled: bool,
}

impl Serialize for ExecuteResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ExecuteResponse", 6)?;
        state.serialize_field("success", &self.success)?;
        match self.exit_code {
            Some(code) => state.serialize_field("exit_code", &code)?,
            None => state.skip_field("exit_code")?,
        }
        match std::str::from_utf8(&self.output) {
            Ok(text) => {
                state.serialize_field("output", text)?;
                state.skip_field("output_encoding")?;
            }
            Err(_) => {
                state.serialize_field("output", &BASE64_STANDARD.encode(&self.output))?;
                state.serialize_field("output_encoding", BASE64_OUTPUT_ENCODING)?;
            }
        }
        match &self.error {
            Some(error) => state.serialize_field("error", error)?,
            None => state.skip_field("error")?,
        }
        if self.cancelled {
            state.serialize_field("cancelled", &true)?;
        } else {
            state.skip_field("cancelled")?;
        }
        state.end()
    }
}

impl From<ExecutionOutcome> for ExecuteResponse {
    fn from(outcome: ExecutionOutcome) -> Self {
        Self {
            success: outcome.success(),
            exit_code: outcome.exit_code(),
            error: outcome.error_message().map(str::to_string),
            cancelled: outcome.is_cancelled(),
            output: match outcome {
                ExecutionOutcome::Exited { output, .. } | ExecutionOutcome::Cancelled { output } => {
                    output
                }
                ExecutionOutcome::SpawnFailed { .. } => Vec::new(),
            },
        }
    }
}

impl From<UsageError> for ExecuteResponse {
    fn from(err: UsageError) -> Self {
        Self {
            success: false,
            exit_code: Some(USAGE_EXIT_CODE),
            output: Vec::new(),
            error: Some(err.to_string()),
            cancelled: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandInfo {
    pub name: String,
    pub usage: String,
    pub description: String,
    pub category: String,
    pub aliases: Vec<String>,
    pub visibility: String,
}

impl From<ActionInfo> for CommandInfo {
    fn from(info: ActionInfo) -> Self {
        Self {
            name: info.name.to_string(),
            usage: info.usage.to_string(),
            description: info.description.to_string(),
            category: info.category.to_string(),
            aliases: info.aliases.iter().map(|a| a.to_string()).collect(),
            visibility: info.visibility.to_string(),
        }
    }
}
