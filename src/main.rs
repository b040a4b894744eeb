//! tempcache - Owner-scoped temporary cache
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use std::process::ExitCode;
use tempcache::cli::{Cli, Commands};
use tempcache::config::{Config, ConfigManager};
use tempcache::error::TempCacheResult;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
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

fn init_logging(verbose: u8, config: &Config) {
    // 0 = warn, 1 = info, 2+ = debug
    let filter = match verbose {
        0 => EnvFilter::new("tempcache=warn"),
        1 => EnvFilter::new("tempcache=info"),
        _ => EnvFilter::new("tempcache=debug"),
    };

    if config.general.log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .without_time()
            .with_writer(std::io::stderr)
            .init();
    }
}

async fn run() -> TempCacheResult<()> {
    let cli = Cli::parse();

    // Keygen doesn't need config loading
    if let Commands::Keygen(args) = cli.command {
        return tempcache::cli::commands::keygen(args);
    }

    let config_manager = match cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new(),
    };

    // Config repairs must work while the file fails validation
    if let Commands::Config(args) = cli.command {
        init_logging(cli.verbose, &Config::default());
        return tempcache::cli::commands::config(args, &config_manager).await;
    }

    let config = config_manager.load().await?;

    init_logging(cli.verbose, &config);
    debug!("Loaded config from {}", config_manager.path().display());

    match cli.command {
        Commands::Keygen(_) | Commands::Config(_) => unreachable!("handled above"),
        Commands::Create(args) => tempcache::cli::commands::create(args, &config).await,
        Commands::Get(args) => tempcache::cli::commands::get(args, &config).await,
        Commands::Update(args) => tempcache::cli::commands::update(args, &config).await,
        Commands::Delete(args) => tempcache::cli::commands::delete(args, &config).await,
    }
}
