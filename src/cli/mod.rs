pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, Commands, CommandsArgs, DetectArgs, ExecArgs};
pub use output::{OutputFormat, OutputFormatter};
