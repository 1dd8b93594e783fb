// src/commands/search.rs
//! Catalog search command

use anyhow::{Context, Result};
use jpm::{Catalog, Config};
use regex::Regex;
use tracing::info;

/// Print every catalog plugin whose name matches `term`
pub fn cmd_search(config: &Config, term: &str) -> Result<()> {
    info!("Searching for plugins matching: {}", term);
    println!("Loading plugin repository data...\n");

    let catalog = Catalog::load_from(&config.repository_path)
        .context("Failed to load the plugin repository")?;
    let pattern =
        Regex::new(term).with_context(|| format!("'{term}' is not a valid search pattern"))?;

    let mut found = 0;
    for plugin in catalog.search(&pattern) {
        println!("- {}\n", plugin.shortform());
        found += 1;
    }

    if found == 0 {
        println!("No plugins found matching '{}'", term);
    }
    Ok(())
}
