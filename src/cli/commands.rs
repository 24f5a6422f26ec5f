use crate::host::CommandRequest;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// PHP and Composer integration for Glide
#[derive(Parser, Debug)]
#[command(
    name = "glide-plugin-php",
    about = "PHP and Composer integration for Glide",
    version,
    long_about = "Detects PHP projects from composer.json and runs Composer, test and \
                  static-analysis tooling on the host's behalf."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Detect PHP project context",
        long_about = "Reads composer.json and reports frameworks, tools and whether \
                      dependencies are installed.\n\n\
                      Examples:\n  \
                      glide-plugin-php detect\n  \
                      glide-plugin-php detect /path/to/project --format json"
    )]
    Detect(DetectArgs),

    #[command(
        about = "Execute a plugin command",
        long_about = "Runs one of the plugin's commands (install, run, test, analyze) against \
                      a project. Output of the child process is streamed back once it exits.\n\n\
                      Examples:\n  \
                      glide-plugin-php exec install\n  \
                      glide-plugin-php exec run lint -- --fix\n  \
                      glide-plugin-php exec test --root /srv/app -- --filter UserTest"
    )]
    Exec(ExecArgs),

    #[command(about = "List the commands this plugin provides")]
    Commands(CommandsArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct DetectArgs {
    #[arg(
        value_name = "PATH",
        help = "Path to project root (defaults to current directory)"
    )]
    pub project_path: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "json",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ExecArgs {
    #[arg(value_name = "COMMAND", help = "Command name or alias")]
    pub command: String,

    #[arg(
        value_name = "ARGS",
        trailing_var_arg = true,
        allow_hyphen_values = true,
        help = "Arguments passed through to the command"
    )]
    pub args: Vec<String>,

    #[arg(
        long,
        value_name = "DIR",
        help = "Project root (defaults to current directory)"
    )]
    pub root: Option<PathBuf>,

    #[arg(
        long,
        value_name = "DIR",
        help = "Working directory, relative to the project root unless absolute"
    )]
    pub workdir: Option<PathBuf>,

    #[arg(
        short = 'e',
        long = "env",
        value_name = "KEY=VALUE",
        value_parser = parse_env_pair,
        help = "Extra environment variable for the child (repeatable)"
    )]
    pub env: Vec<(String, String)>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format (human writes the captured output verbatim)"
    )]
    pub format: OutputFormatArg,
}

impl ExecArgs {
    /// The host-protocol request equivalent to this invocation.
    pub fn command_request(&self, project_root: PathBuf) -> CommandRequest {
        CommandRequest {
            command: self.command.clone(),
            args: self.args.clone(),
            project_root,
            working_dir: self.workdir.clone(),
            env: self.env.iter().cloned().collect(),
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct CommandsArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

fn parse_env_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("Invalid environment entry: {}. Expected KEY=VALUE", s)),
    }
}
