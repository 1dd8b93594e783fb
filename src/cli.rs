// src/cli.rs
//! CLI definitions for jpm
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "jpm")]
#[command(author = "jpm Contributors")]
#[command(version)]
#[command(about = "Search, resolve and install Jenkins plugins", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use jpm in a fully offline mode
    #[arg(long, global = true)]
    pub offline: bool,

    /// Path to a config file (default: <config dir>/jpm/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search for available plugins
    Search {
        /// Regular expression matched against plugin names
        term: String,
    },

    /// Update the local plugin repository meta-data
    Update {
        /// Use a different update-center URL
        #[arg(long)]
        source: Option<String>,

        /// Forcefully overwrite any existing repository
        #[arg(short, long)]
        force: bool,
    },

    /// Install the named plugins and their dependencies
    Install {
        /// Plugin names
        #[arg(required = true)]
        names: Vec<String>,

        /// Show what would be installed without downloading anything
        #[arg(long)]
        dry_run: bool,

        /// Do not install optional dependencies
        #[arg(long)]
        no_optional: bool,

        /// Download plugins concurrently
        #[arg(long)]
        parallel: bool,
    },

    /// List the installed plugins, optionally filtered by TERM
    List {
        /// Regular expression matched against installed plugin names
        term: Option<String>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_install_requires_names() {
        assert!(Cli::try_parse_from(["jpm", "install"]).is_err());

        let cli = Cli::try_parse_from(["jpm", "install", "git", "ant"]).unwrap();
        match cli.command {
            Some(Commands::Install { names, .. }) => assert_eq!(names, vec!["git", "ant"]),
            _ => panic!("expected install"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["jpm", "update", "--force", "--offline"]).unwrap();
        assert!(cli.offline);
        assert!(matches!(
            cli.command,
            Some(Commands::Update { force: true, source: None })
        ));
    }
}
