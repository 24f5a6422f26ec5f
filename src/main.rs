use glide_plugin_php::cli::commands::{CliArgs, Commands};
use glide_plugin_php::cli::handlers::{handle_commands, handle_detect, handle_exec};
use glide_plugin_php::util::logging::{self, LoggingConfig};
use glide_plugin_php::{PluginConfig, VERSION};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    init_logging_from_args(&args, &config);

    debug!("glide-plugin-php v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Detect(detect_args) => handle_detect(detect_args, &config),
        Commands::Exec(exec_args) => handle_exec(exec_args, &config).await,
        Commands::Commands(commands_args) => handle_commands(commands_args, &config),
    };

    std::process::exit(exit_code);
}

fn load_config() -> Result<PluginConfig> {
    let config = PluginConfig::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn init_logging_from_args(args: &CliArgs, config: &PluginConfig) {
    let mut logging_config = LoggingConfig::from_plugin_config(config);

    if let Some(level_str) = &args.log_level {
        logging_config.level = logging::parse_level(level_str);
    } else if args.verbose {
        logging_config.level = Level::DEBUG;
    } else if args.quiet {
        logging_config.level = Level::ERROR;
    }

    logging::init_logging(logging_config);
}
