// src/commands/install.rs
//! Plugin installation command

use super::progress::InstallProgress;
use super::{require_jenkins, require_network};
use anyhow::{bail, Context, Result};
use jpm::{
    Catalog, Config, Error, Fetcher, HttpFetcher, InstallObserver, InstallSummary, Installer,
    ResolutionResult, Resolver,
};
use tracing::info;

/// Flags for `jpm install`
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    pub offline: bool,
    pub dry_run: bool,
    pub no_optional: bool,
    pub parallel: bool,
}

/// Install the named plugins and everything they depend on
pub fn cmd_install(config: &Config, names: &[String], options: &InstallOptions) -> Result<()> {
    require_jenkins(config)?;
    if !options.dry_run {
        require_network(options.offline, "install")?;
    }

    let fetcher = HttpFetcher::with_timeout(config.http_timeout)?;
    let Some(summary) = install_with(config, &fetcher, names, options)? else {
        return Ok(());
    };

    if summary.installed.is_empty() {
        println!("Nothing installed.");
    } else {
        let installed: Vec<String> = summary
            .installed
            .iter()
            .map(|p| format!("{} v{}", p.display_title(), p.version))
            .collect();
        println!(
            "\n{} will be loaded on the next restart of Jenkins!",
            installed.join(", ")
        );
    }

    if summary.every_request_failed(names) {
        bail!("none of the requested plugins could be installed");
    }
    if summary.has_failures() {
        println!("{} plugin(s) failed to install", summary.failed_count());
    }
    Ok(())
}

/// Resolve and install with the given fetcher
///
/// Returns `None` for a dry run.
fn install_with<F>(
    config: &Config,
    fetcher: &F,
    names: &[String],
    options: &InstallOptions,
) -> Result<Option<InstallSummary>>
where
    F: Fetcher + Sync,
{
    println!("Loading plugin repository data...\n");
    let catalog = Catalog::load_from(&config.repository_path)
        .context("Failed to load the plugin repository")?;

    let plugins = config.plugins();
    let installed = plugins
        .list_installed_names()
        .with_context(|| format!("Failed to read {}", plugins.path().display()))?;

    let resolution = match Resolver::new(&catalog, &installed)
        .include_optional(!options.no_optional)
        .compute(names)
    {
        Ok(resolution) => resolution,
        Err(Error::UnknownPlugin(unknown)) => {
            for name in &unknown {
                println!("`{name}` is not a plugin I'm familiar with!\n");
            }
            println!("Use `jpm search TERM` to find the correct plugin name");
            return Err(Error::UnknownPlugin(unknown).into());
        }
        Err(e) => return Err(e.into()),
    };

    println!("Getting ready to install...");
    for name in names {
        println!("- {name}");
    }
    for shortfall in &resolution.shortfalls {
        println!("warning: {shortfall}");
    }

    if options.dry_run {
        print_plan(&resolution);
        return Ok(None);
    }

    info!(
        "Installing {} plugin(s) into {}",
        resolution.to_install.len(),
        plugins.path().display()
    );

    let total = (resolution.to_install.len() + resolution.satisfied.len()) as u64;
    let mut progress = InstallProgress::new(total);
    let summary = run_installer(
        Installer::new(fetcher, &plugins),
        &resolution,
        &mut progress,
        options.parallel || config.parallel_downloads,
    );
    progress.finish();

    Ok(Some(summary))
}

fn run_installer<F, W>(
    installer: Installer<'_, F, W>,
    resolution: &ResolutionResult,
    observer: &mut dyn InstallObserver,
    parallel: bool,
) -> InstallSummary
where
    F: Fetcher + Sync,
    W: jpm::PluginWriter,
{
    if parallel {
        installer.install_all_parallel(resolution, observer)
    } else {
        installer.install_all(resolution, observer)
    }
}

fn print_plan(resolution: &ResolutionResult) {
    for satisfied in &resolution.satisfied {
        println!("{satisfied}");
    }
    if resolution.is_empty() {
        println!("Nothing to install.");
        return;
    }
    println!("\nWould install (in order):");
    for plugin in &resolution.to_install {
        println!("  {} v{} -> {}", plugin.name, plugin.version, plugin.filename());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jpm::config::ConfigFile;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const DOCUMENT: &str = r#"updateCenter.post(
{"plugins": {
  "git": {"name": "git", "version": "2.0", "url": "https://example/dl/git.hpi",
          "dependencies": [{"name": "scm-api", "version": "1.0", "optional": false}]},
  "scm-api": {"name": "scm-api", "version": "1.2", "url": "https://example/dl/scm-api.hpi"},
  "broken": {"name": "broken", "version": "0.1", "url": "https://example/dl/broken.hpi"}
}}
);"#;

    fn setup(home: &Path) -> Config {
        let repository_path = home.join("update-center.json");
        fs::write(&repository_path, DOCUMENT).unwrap();
        Config::from_file(
            ConfigFile {
                repository_path: Some(repository_path),
                ..Default::default()
            },
            Some(home.to_path_buf()),
        )
    }

    fn fetch(url: &str) -> jpm::Result<Vec<u8>> {
        if url.contains("broken") {
            Err(Error::FetchError(format!("HTTP 404 from {url}")))
        } else {
            Ok(url.as_bytes().to_vec())
        }
    }

    #[test]
    fn test_install_writes_closure() {
        let temp = TempDir::new().unwrap();
        let config = setup(temp.path());

        let summary = install_with(&config, &fetch, &["git".to_string()], &InstallOptions::default())
            .unwrap()
            .unwrap();

        assert_eq!(summary.installed_count(), 2);
        assert!(config.plugins_dir.join("git.hpi").is_file());
        assert!(config.plugins_dir.join("scm-api.hpi").is_file());
    }

    #[test]
    fn test_second_install_is_noop() {
        let temp = TempDir::new().unwrap();
        let config = setup(temp.path());
        let names = vec!["git".to_string()];

        install_with(&config, &fetch, &names, &InstallOptions::default()).unwrap();
        let summary = install_with(&config, &fetch, &names, &InstallOptions::default())
            .unwrap()
            .unwrap();

        assert_eq!(summary.installed_count(), 0);
        assert_eq!(summary.already_installed, vec!["git"]);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let config = setup(temp.path());
        let options = InstallOptions {
            dry_run: true,
            ..Default::default()
        };

        let summary = install_with(&config, &fetch, &["git".to_string()], &options).unwrap();

        assert!(summary.is_none());
        assert!(!config.plugins_dir.exists());
    }

    #[test]
    fn test_unknown_plugin_aborts_before_fetch() {
        let temp = TempDir::new().unwrap();
        let config = setup(temp.path());
        let names = vec!["git".to_string(), "doesnotexist".to_string()];

        let err = install_with(&config, &fetch, &names, &InstallOptions::default()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::UnknownPlugin(unknown)) if unknown == &vec!["doesnotexist".to_string()]
        ));
        assert!(!config.plugins_dir.exists());
    }

    #[test]
    fn test_failed_download_counted() {
        let temp = TempDir::new().unwrap();
        let config = setup(temp.path());
        let names = vec!["broken".to_string()];
        let options = InstallOptions {
            parallel: true,
            ..Default::default()
        };

        let summary = install_with(&config, &fetch, &names, &options).unwrap().unwrap();

        assert_eq!(summary.failed_count(), 1);
        assert!(summary.every_request_failed(&names));
    }

    #[test]
    fn test_offline_install_refused() {
        let temp = TempDir::new().unwrap();
        let config = setup(temp.path());
        let options = InstallOptions {
            offline: true,
            ..Default::default()
        };

        assert!(cmd_install(&config, &["git".to_string()], &options).is_err());
        assert!(!config.plugins_dir.exists());
    }
}
