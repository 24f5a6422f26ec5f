//! Output formatting for the binary
//!
//! JSON and YAML render the host wire shapes as-is. Human output is for people
//! running the plugin by hand.

use anyhow::{Context, Result};

use crate::host::{CommandInfo, ContextResponse, ExecuteResponse};

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format
    Yaml,
    /// Human-readable formatted text
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_context(&self, response: &ContextResponse) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(response)
                .context("Failed to serialize context response to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(response)
                .context("Failed to serialize context response to YAML"),
            OutputFormat::Human => Ok(self.format_context_human(response)),
        }
    }

    /// Human output is the child's combined output, byte for byte.
    pub fn format_execute(&self, response: &ExecuteResponse) -> Result<Vec<u8>> {
        match self.format {
            OutputFormat::Json => serde_json::to_vec_pretty(response)
                .context("Failed to serialize execute response to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(response)
                .map(String::into_bytes)
                .context("Failed to serialize execute response to YAML"),
            OutputFormat::Human => Ok(response.output.clone()),
        }
    }

    pub fn format_commands(&self, commands: &[CommandInfo]) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(commands)
                .context("Failed to serialize commands to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(commands).context("Failed to serialize commands to YAML")
            }
            OutputFormat::Human => Ok(self.format_commands_human(commands)),
        }
    }

    fn format_context_human(&self, response: &ContextResponse) -> String {
        let mut output = String::new();

        if !response.detected {
            output.push_str("\u{2717} No PHP project detected\n");
            return output;
        }

        output.push_str("\u{2713} PHP Project\n");
        output.push_str(RULE);
        output.push_str("\n\n");

        if let Some(ref version) = response.version {
            output.push_str(&format!("PHP:         {}\n", version));
        }
        output.push_str(&format!("Frameworks:  {}\n", join_or_none(&response.frameworks)));
        output.push_str(&format!("Tools:       {}\n", join_or_none(&response.tools)));

        let details: Vec<_> = response
            .metadata
            .iter()
            .filter(|(key, _)| key.as_str() != "php_version" && key.as_str() != "error")
            .collect();
        if !details.is_empty() {
            output.push_str("\nProject:\n");
            for (i, (key, value)) in details.iter().enumerate() {
                let connector = if i == details.len() - 1 {
                    "\u{2514}"
                } else {
                    "\u{251C}"
                };
                output.push_str(&format!("{}\u{2500} {}: {}\n", connector, key, value));
            }
        }

        if let Some(error) = response.metadata.get("error") {
            output.push_str(&format!("\n\u{26A0} {}\n", error));
        }

        output
    }

    fn format_commands_human(&self, commands: &[CommandInfo]) -> String {
        let width = commands.iter().map(|c| c.usage.len()).max().unwrap_or(0);
        let mut output = String::new();

        for command in commands {
            output.push_str(&format!(
                "{:width$}  {}",
                command.usage,
                command.description,
                width = width
            ));
            if !command.aliases.is_empty() {
                output.push_str(&format!(" (alias: {})", command.aliases.join(", ")));
            }
            output.push('\n');
        }

        output
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}
