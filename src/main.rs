// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use commands::InstallOptions;
use jpm::Config;
use tracing::debug;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber for logging; RUST_LOG wins over --verbose
    let default_filter = if cli.verbose { "jpm=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    if let Commands::Completions { shell } = command {
        clap_complete::generate(shell, &mut Cli::command(), "jpm", &mut std::io::stdout());
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref())?;
    debug!("Using configuration: {:?}", config);

    match command {
        Commands::Search { term } => commands::cmd_search(&config, &term),
        Commands::Update { source, force } => {
            commands::cmd_update(&config, source.as_deref(), force, cli.offline)
        }
        Commands::Install {
            names,
            dry_run,
            no_optional,
            parallel,
        } => {
            let options = InstallOptions {
                offline: cli.offline,
                dry_run,
                no_optional,
                parallel,
            };
            commands::cmd_install(&config, &names, &options)
        }
        Commands::List { term } => commands::cmd_list(&config, term.as_deref()),
        Commands::Completions { .. } => Ok(()),
    }
}
