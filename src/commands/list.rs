// src/commands/list.rs
//! Installed plugin listing

use super::require_jenkins;
use anyhow::Result;
use jpm::Config;
use tracing::info;

/// List installed plugins, optionally filtered by a pattern
pub fn cmd_list(config: &Config, term: Option<&str>) -> Result<()> {
    require_jenkins(config)?;
    info!("Listing installed plugins");

    let plugins = config.plugins();
    if !plugins.has_plugins()? {
        println!("No plugins installed.");
        return Ok(());
    }

    let names = plugins.installed_matching(term)?;
    if names.is_empty() {
        if let Some(term) = term {
            println!("No installed plugins match '{}'", term);
        }
    }
    for name in names {
        println!("{} is installed", name);
    }
    Ok(())
}
