// src/lib.rs

//! jpm - Jenkins plugin manager
//!
//! Reads the update-center catalog, resolves a requested set of plugins to
//! their full dependency closure, and installs whatever is not already
//! present in the plugins directory.
//!
//! # Architecture
//!
//! - Catalog: name-keyed index of plugin records parsed from the JSONP
//!   update-center document
//! - Resolver: pure depth-first closure over a catalog and an installed-set
//!   snapshot; dependencies come out before their dependents
//! - Installer: best-effort fetch-and-write per resolved plugin, reporting
//!   each outcome to an observer
//! - Collaborators: HTTP fetching and the plugins directory sit behind the
//!   `Fetcher` and `PluginWriter` traits

pub mod catalog;
pub mod config;
mod error;
pub mod installer;
pub mod plugin;
pub mod plugins_dir;
pub mod repository;
pub mod resolver;
pub mod version;

pub use catalog::Catalog;
pub use config::Config;
pub use error::{Error, Result};
pub use installer::{
    FailedInstall, Fetcher, InstallObserver, InstallOutcome, InstallSummary, Installer,
    PluginWriter, SilentObserver,
};
pub use plugin::{Dependency, Plugin};
pub use plugins_dir::PluginsDir;
pub use repository::{update_catalog, HttpFetcher};
pub use resolver::{
    InstalledSet, ResolutionResult, Resolver, Satisfied, SatisfiedReason, VersionShortfall,
};
