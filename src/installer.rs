// src/installer.rs

//! Plugin installation
//!
//! The installer executes a [`ResolutionResult`]: for each plugin it fetches
//! the artifact, writes it into the plugins directory and reports the
//! outcome to an [`InstallObserver`]. Network and disk access go through
//! the [`Fetcher`] and [`PluginWriter`] collaborators so the pipeline can be
//! driven without either.
//!
//! # Semantics
//!
//! - Best effort: a failed fetch or write is reported and the batch moves on.
//! - Order: writes and observer events follow resolution order exactly.
//! - Already-satisfied plugins from the resolution are reported first, then
//!   each plugin of the install set. A plugin in the install set that is also
//!   marked satisfied (a stale result) is reported as already installed and
//!   not fetched.
//! - [`Installer::install_all_parallel`] fetches every artifact concurrently
//!   but still writes and reports sequentially in resolution order.

use crate::error::{Error, Result};
use crate::plugin::Plugin;
use crate::resolver::ResolutionResult;
use rayon::prelude::*;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Downloads artifact bytes
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

impl<F> Fetcher for F
where
    F: Fn(&str) -> Result<Vec<u8>>,
{
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self(url)
    }
}

/// Persists artifact bytes into the plugins directory
pub trait PluginWriter {
    fn write(&self, filename: &str, bytes: &[u8]) -> Result<()>;
}

impl<F> PluginWriter for F
where
    F: Fn(&str, &[u8]) -> Result<()>,
{
    fn write(&self, filename: &str, bytes: &[u8]) -> Result<()> {
        self(filename, bytes)
    }
}

/// Per-plugin result of an install run
#[derive(Debug)]
pub enum InstallOutcome<'a> {
    Installed(&'a Plugin),
    AlreadyInstalled(&'a Plugin),
    Failed(&'a Plugin, &'a Error),
}

impl InstallOutcome<'_> {
    pub fn plugin(&self) -> &Plugin {
        match self {
            Self::Installed(p) | Self::AlreadyInstalled(p) | Self::Failed(p, _) => p,
        }
    }
}

/// Receives one event per plugin, in resolution order
pub trait InstallObserver {
    fn on_outcome(&mut self, outcome: &InstallOutcome<'_>);
}

impl<F> InstallObserver for F
where
    F: FnMut(&InstallOutcome<'_>),
{
    fn on_outcome(&mut self, outcome: &InstallOutcome<'_>) {
        self(outcome)
    }
}

/// Observer that discards every event
#[derive(Debug, Default)]
pub struct SilentObserver;

impl InstallObserver for SilentObserver {
    fn on_outcome(&mut self, _outcome: &InstallOutcome<'_>) {}
}

/// A plugin that could not be installed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedInstall {
    pub name: String,
    pub reason: String,
}

/// Totals for one install run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallSummary {
    /// Plugins written to disk, in order
    pub installed: Vec<Plugin>,
    /// Names reported as already installed
    pub already_installed: Vec<String>,
    pub failed: Vec<FailedInstall>,
}

impl InstallSummary {
    pub fn installed_count(&self) -> usize {
        self.installed.len()
    }

    pub fn already_installed_count(&self) -> usize {
        self.already_installed.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// True when every requested name failed outright
    ///
    /// This drives the command's exit status: partial success is success.
    pub fn every_request_failed<S: AsRef<str>>(&self, requested: &[S]) -> bool {
        if requested.is_empty() {
            return false;
        }
        let failed: HashSet<&str> = self.failed.iter().map(|f| f.name.as_str()).collect();
        requested.iter().all(|name| failed.contains(name.as_ref()))
    }
}

/// Executes resolution results against fetch and write collaborators
pub struct Installer<'a, F, W> {
    fetcher: &'a F,
    writer: &'a W,
}

impl<'a, F, W> Installer<'a, F, W>
where
    F: Fetcher,
    W: PluginWriter,
{
    pub fn new(fetcher: &'a F, writer: &'a W) -> Self {
        Self { fetcher, writer }
    }

    /// Install every plugin of `result` sequentially
    pub fn install_all<O>(&self, result: &ResolutionResult, observer: &mut O) -> InstallSummary
    where
        O: InstallObserver + ?Sized,
    {
        let mut summary = InstallSummary::default();
        report_satisfied(result, observer, &mut summary);

        for plugin in &result.to_install {
            if result.is_satisfied(&plugin.name) {
                self.settle_already_installed(plugin, observer, &mut summary);
                continue;
            }
            let fetched = self.fetch(plugin);
            self.settle(plugin, fetched, observer, &mut summary);
        }

        log_summary(&summary);
        summary
    }

    fn fetch(&self, plugin: &Plugin) -> Result<Vec<u8>> {
        debug!("Fetching {} from {}", plugin.name, plugin.url);
        self.fetcher.fetch(&plugin.url)
    }

    fn settle<O>(
        &self,
        plugin: &Plugin,
        fetched: Result<Vec<u8>>,
        observer: &mut O,
        summary: &mut InstallSummary,
    ) where
        O: InstallObserver + ?Sized,
    {
        let outcome = fetched.and_then(|bytes| {
            let filename = plugin.filename();
            debug!("Writing {} ({} bytes)", filename, bytes.len());
            self.writer.write(&filename, &bytes)
        });

        match outcome {
            Ok(()) => {
                info!("Installed {} v{}", plugin.name, plugin.version);
                observer.on_outcome(&InstallOutcome::Installed(plugin));
                summary.installed.push(plugin.clone());
            }
            Err(e) => {
                warn!("Failed to install {}: {}", plugin.name, e);
                observer.on_outcome(&InstallOutcome::Failed(plugin, &e));
                summary.failed.push(FailedInstall {
                    name: plugin.name.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    fn settle_already_installed<O>(
        &self,
        plugin: &Plugin,
        observer: &mut O,
        summary: &mut InstallSummary,
    ) where
        O: InstallObserver + ?Sized,
    {
        if summary.already_installed.contains(&plugin.name) {
            return;
        }
        observer.on_outcome(&InstallOutcome::AlreadyInstalled(plugin));
        summary.already_installed.push(plugin.name.clone());
    }
}

impl<F, W> Installer<'_, F, W>
where
    F: Fetcher + Sync,
    W: PluginWriter,
{
    /// Fetch all artifacts concurrently, then write and report in order
    pub fn install_all_parallel<O>(
        &self,
        result: &ResolutionResult,
        observer: &mut O,
    ) -> InstallSummary
    where
        O: InstallObserver + ?Sized,
    {
        let mut summary = InstallSummary::default();
        report_satisfied(result, observer, &mut summary);

        let pending: Vec<&Plugin> = result
            .to_install
            .iter()
            .filter(|p| !result.is_satisfied(&p.name))
            .collect();
        debug!("Fetching {} plugins in parallel", pending.len());

        // Indexed collect keeps resolution order
        let fetcher = self.fetcher;
        let fetched: Vec<Result<Vec<u8>>> = pending
            .par_iter()
            .map(|plugin| {
                debug!("Fetching {} from {}", plugin.name, plugin.url);
                fetcher.fetch(&plugin.url)
            })
            .collect();
        let mut fetched = fetched.into_iter();

        for plugin in &result.to_install {
            if result.is_satisfied(&plugin.name) {
                self.settle_already_installed(plugin, observer, &mut summary);
                continue;
            }
            let bytes = fetched.next().unwrap_or_else(|| {
                Err(Error::FetchError(format!("{} was not fetched", plugin.name)))
            });
            self.settle(plugin, bytes, observer, &mut summary);
        }

        log_summary(&summary);
        summary
    }
}

fn report_satisfied<O>(result: &ResolutionResult, observer: &mut O, summary: &mut InstallSummary)
where
    O: InstallObserver + ?Sized,
{
    for satisfied in &result.satisfied {
        observer.on_outcome(&InstallOutcome::AlreadyInstalled(&satisfied.plugin));
        summary.already_installed.push(satisfied.plugin.name.clone());
    }
}

fn log_summary(summary: &InstallSummary) {
    info!(
        "Install finished: {} installed, {} already installed, {} failed",
        summary.installed_count(),
        summary.already_installed_count(),
        summary.failed_count()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{Satisfied, SatisfiedReason};
    use std::cell::RefCell;
    use std::collections::HashMap;

    fn plugin(name: &str) -> Plugin {
        Plugin::new(name, "1.0", format!("https://example/dl/{name}.hpi"))
    }

    fn result_of(names: &[&str]) -> ResolutionResult {
        ResolutionResult {
            to_install: names.iter().map(|n| plugin(n)).collect(),
            ..Default::default()
        }
    }

    fn ok_fetch(url: &str) -> Result<Vec<u8>> {
        Ok(url.as_bytes().to_vec())
    }

    #[test]
    fn test_installs_in_order_and_writes_url_basename() {
        let written = RefCell::new(Vec::new());
        let writer = |filename: &str, bytes: &[u8]| -> Result<()> {
            written.borrow_mut().push((filename.to_string(), bytes.to_vec()));
            Ok(())
        };
        let mut events = Vec::new();
        let mut observer = |o: &InstallOutcome<'_>| events.push(o.plugin().name.clone());

        let summary = Installer::new(&ok_fetch, &writer)
            .install_all(&result_of(&["scm-api", "git"]), &mut observer);

        assert_eq!(summary.installed_count(), 2);
        assert_eq!(events, vec!["scm-api", "git"]);
        let written = written.into_inner();
        assert_eq!(written[0].0, "scm-api.hpi");
        assert_eq!(written[1].0, "git.hpi");
        assert_eq!(written[1].1, b"https://example/dl/git.hpi".to_vec());
    }

    #[test]
    fn test_fetch_failure_does_not_abort_batch() {
        let fetch = |url: &str| -> Result<Vec<u8>> {
            if url.ends_with("x.hpi") {
                Err(Error::FetchError("HTTP 404".to_string()))
            } else {
                Ok(vec![1, 2, 3])
            }
        };
        let writer = |_: &str, _: &[u8]| -> Result<()> { Ok(()) };
        let mut outcomes = Vec::new();
        let mut observer = |o: &InstallOutcome<'_>| {
            let tag = match o {
                InstallOutcome::Installed(_) => "installed",
                InstallOutcome::AlreadyInstalled(_) => "already",
                InstallOutcome::Failed(_, _) => "failed",
            };
            outcomes.push(format!("{}:{}", tag, o.plugin().name));
        };

        let summary =
            Installer::new(&fetch, &writer).install_all(&result_of(&["x", "y"]), &mut observer);

        assert_eq!(outcomes, vec!["failed:x", "installed:y"]);
        assert_eq!(summary.installed_count(), 1);
        assert_eq!(summary.failed_count(), 1);
        assert_eq!(summary.failed[0].name, "x");
        assert!(summary.failed[0].reason.contains("HTTP 404"));
    }

    #[test]
    fn test_write_failure_reported() {
        let writer = |_: &str, _: &[u8]| -> Result<()> {
            Err(Error::WriteError("read-only file system".to_string()))
        };
        let summary = Installer::new(&ok_fetch, &writer)
            .install_all(&result_of(&["git"]), &mut SilentObserver);

        assert_eq!(summary.installed_count(), 0);
        assert_eq!(summary.failed_count(), 1);
    }

    #[test]
    fn test_stale_result_not_refetched() {
        let fetched = RefCell::new(Vec::new());
        let fetch = |url: &str| -> Result<Vec<u8>> {
            fetched.borrow_mut().push(url.to_string());
            Ok(Vec::new())
        };
        let writer = |_: &str, _: &[u8]| -> Result<()> { Ok(()) };

        let mut result = result_of(&["git"]);
        result.satisfied.push(Satisfied {
            plugin: plugin("git"),
            reason: SatisfiedReason::AlreadyInstalled,
        });

        let summary = Installer::new(&fetch, &writer).install_all(&result, &mut SilentObserver);

        assert!(fetched.borrow().is_empty());
        assert_eq!(summary.installed_count(), 0);
        assert_eq!(summary.already_installed, vec!["git"]);
    }

    #[test]
    fn test_satisfied_plugins_reported_first() {
        let writer = |_: &str, _: &[u8]| -> Result<()> { Ok(()) };
        let mut result = result_of(&["git"]);
        result.satisfied.push(Satisfied {
            plugin: plugin("scm-api"),
            reason: SatisfiedReason::InstalledDependency {
                required_by: "git".to_string(),
            },
        });
        let mut events = Vec::new();
        let mut observer = |o: &InstallOutcome<'_>| {
            events.push(matches!(o, InstallOutcome::AlreadyInstalled(_)));
        };

        let summary = Installer::new(&ok_fetch, &writer).install_all(&result, &mut observer);

        assert_eq!(events, vec![true, false]);
        assert_eq!(summary.already_installed_count(), 1);
        assert_eq!(summary.installed_count(), 1);
    }

    #[test]
    fn test_parallel_preserves_order() {
        let bodies: HashMap<String, Vec<u8>> = ["a", "b", "c", "d"]
            .iter()
            .map(|n| (format!("https://example/dl/{n}.hpi"), n.as_bytes().to_vec()))
            .collect();
        let fetch = move |url: &str| -> Result<Vec<u8>> {
            bodies
                .get(url)
                .cloned()
                .ok_or_else(|| Error::FetchError(url.to_string()))
        };
        let written = std::sync::Mutex::new(Vec::new());
        let writer = |filename: &str, _: &[u8]| -> Result<()> {
            written.lock().unwrap().push(filename.to_string());
            Ok(())
        };
        let mut events = Vec::new();
        let mut observer = |o: &InstallOutcome<'_>| events.push(o.plugin().name.clone());

        let summary = Installer::new(&fetch, &writer)
            .install_all_parallel(&result_of(&["a", "b", "c", "d"]), &mut observer);

        assert_eq!(summary.installed_count(), 4);
        assert_eq!(events, vec!["a", "b", "c", "d"]);
        assert_eq!(
            written.into_inner().unwrap(),
            vec!["a.hpi", "b.hpi", "c.hpi", "d.hpi"]
        );
    }

    #[test]
    fn test_every_request_failed() {
        let summary = InstallSummary {
            failed: vec![FailedInstall {
                name: "git".to_string(),
                reason: "HTTP 500".to_string(),
            }],
            ..Default::default()
        };
        assert!(summary.every_request_failed(&["git"]));
        assert!(!summary.every_request_failed(&["git", "ant"]));
        assert!(!summary.every_request_failed::<&str>(&[]));
    }
}
