//! ckpt - checkpoint cache maintenance
//!
//! CLI entry point that dispatches to subcommands.

use ckpt::cli::{Cli, Commands};
use ckpt::config::ConfigManager;
use ckpt::error::{CheckpointError, CkptResult};
use ckpt::ui;
use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> CkptResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };

    let local_config_path = if cli.no_local {
        None
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| CheckpointError::io("getting current directory", e))?;
        ConfigManager::find_local_config(&cwd)
    };

    let config = config_manager.load_merged(local_config_path.as_deref())?;

    init_logging(cli.verbose, &config.general.log_format);
    ui::init_theme();

    match local_config_path {
        Some(ref path) => debug!("Using local config: {}", path.display()),
        None if cli.no_local => debug!("Local config discovery disabled (--no-local)"),
        None => {}
    }

    match cli.command {
        Commands::List(args) => ckpt::cli::commands::list(args, &config),
        Commands::Show(args) => ckpt::cli::commands::show(args, &config),
        Commands::Verify(args) => ckpt::cli::commands::verify(args, &config),
        Commands::Clean(args) => ckpt::cli::commands::clean(args, &config),
        Commands::Config(args) => ckpt::cli::commands::config(args, &config, &config_manager),
    }
}

/// 0 = warn, 1 = info, 2+ = debug; logs go to stderr so stdout stays parseable
fn init_logging(verbose: u8, format: &str) {
    let filter = match verbose {
        0 => EnvFilter::new("ckpt=warn"),
        1 => EnvFilter::new("ckpt=info"),
        _ => EnvFilter::new("ckpt=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr);

    if format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}
