// src/commands/update.rs
//! Catalog update command

use super::{confirm, require_network};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use jpm::{update_catalog, Config, HttpFetcher};
use tracing::info;

/// Download the update-center catalog to the local repository path
pub fn cmd_update(config: &Config, source: Option<&str>, force: bool, offline: bool) -> Result<()> {
    require_network(offline, "update")?;

    let url = source.unwrap_or(config.update_center_url.as_str());
    let dest = &config.repository_path;

    if dest.exists()
        && !force
        && !confirm("A version of the repo is already on disk, overwrite?")?
    {
        println!("Keeping the existing repository at {}", dest.display());
        return Ok(());
    }

    println!("Fetching <{}> ...\n", url);
    info!("Updating catalog from {} into {}", url, dest.display());

    let bar = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .template("{bytes}/{total_bytes} [{bar:40.cyan/dim}] {bytes_per_sec}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);

    let fetcher = HttpFetcher::with_timeout(config.http_timeout)?.with_progress(bar.clone());
    let result = update_catalog(&fetcher, url, dest);
    bar.finish_and_clear();

    let count = result.with_context(|| format!("Failed to update the repository from {url}"))?;
    println!("Wrote {} plugins to {}", count, dest.display());
    Ok(())
}
