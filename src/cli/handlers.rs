//! Subcommand handlers. Each returns the process exit code.

use super::commands::{CommandsArgs, DetectArgs, ExecArgs, OutputFormatArg};
use super::output::OutputFormatter;
use crate::config::PluginConfig;
use crate::host::{ContextRequest, EcosystemPlugin, ExecuteResponse, PhpPlugin};
use anyhow::{Context, Result};
use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Exit status after Ctrl-C, following the shell convention of 128 + SIGINT
pub const CANCELLED_EXIT_CODE: i32 = 130;

const FAILURE_EXIT_CODE: i32 = 1;

pub fn handle_detect(args: &DetectArgs, config: &PluginConfig) -> i32 {
    match run_detect(args, config) {
        Ok(()) => 0,
        Err(e) => report(e),
    }
}

pub async fn handle_exec(args: &ExecArgs, config: &PluginConfig) -> i32 {
    match run_exec(args, config).await {
        Ok(code) => code,
        Err(e) => report(e),
    }
}

pub fn handle_commands(args: &CommandsArgs, config: &PluginConfig) -> i32 {
    let plugin = PhpPlugin::from_config(config);
    let formatter = OutputFormatter::new(args.format.into());

    match formatter.format_commands(&plugin.commands()) {
        Ok(output) => {
            print!("{}", output);
            0
        }
        Err(e) => report(e),
    }
}

fn report(err: anyhow::Error) -> i32 {
    error!("{:#}", err);
    eprintln!("Error: {:#}", err);
    FAILURE_EXIT_CODE
}

fn resolve_root(path: Option<&PathBuf>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path.clone()),
        None => env::current_dir().context("Failed to determine current directory"),
    }
}

fn run_detect(args: &DetectArgs, config: &PluginConfig) -> Result<()> {
    let root = resolve_root(args.project_path.as_ref())?;
    info!(root = %root.display(), "Detecting PHP project");

    let plugin = PhpPlugin::from_config(config);
    let response = plugin
        .context_response(&ContextRequest::new(&root))
        .with_context(|| format!("Failed to detect project at {}", root.display()))?;

    let output = OutputFormatter::new(args.format.into()).format_context(&response)?;
    println!("{}", output.trim_end());
    Ok(())
}

async fn run_exec(args: &ExecArgs, config: &PluginConfig) -> Result<i32> {
    let root = resolve_root(args.root.as_ref())?;

    let request = args.command_request(root);

    let cancel = CancellationToken::new();
    let interrupt = tokio::spawn(cancel_on_interrupt(cancel.clone()));

    let plugin = PhpPlugin::from_config(config);
    let result = plugin.execute(&request, &cancel).await;
    interrupt.abort();

    let response = result.with_context(|| format!("Failed to execute {}", args.command))?;
    write_response(&response, args.format)?;

    Ok(exit_code_for(&response))
}

async fn cancel_on_interrupt(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        debug!("Interrupt received, cancelling command");
        cancel.cancel();
    }
}

fn write_response(response: &ExecuteResponse, format: OutputFormatArg) -> Result<()> {
    let bytes = OutputFormatter::new(format.into()).format_execute(response)?;

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(&bytes)
        .and_then(|_| stdout.flush())
        .context("Failed to write command output")?;

    if format == OutputFormatArg::Human {
        if let Some(ref err) = response.error {
            eprintln!("Error: {}", err);
        }
    }
    Ok(())
}

pub fn exit_code_for(response: &ExecuteResponse) -> i32 {
    if response.cancelled {
        return CANCELLED_EXIT_CODE;
    }
    response.exit_code.unwrap_or(FAILURE_EXIT_CODE)
}
