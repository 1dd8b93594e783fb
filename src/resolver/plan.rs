// src/resolver/plan.rs

//! Resolution input and output types
//!
//! [`InstalledSet`] is the snapshot of what is already on disk;
//! [`ResolutionResult`] is what the resolver hands to the installer.

use crate::plugin::Plugin;
use std::collections::BTreeSet;
use std::fmt;

/// Snapshot of plugin names present in the plugins directory
///
/// Taken once per resolution; installs made by other processes afterwards
/// are not observed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledSet {
    names: BTreeSet<String>,
}

impl InstalledSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for InstalledSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Why a plugin was left out of the install set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SatisfiedReason {
    /// Requested directly and already installed
    AlreadyInstalled,
    /// Reached as a dependency and already installed
    InstalledDependency { required_by: String },
}

/// A plugin that needs no installation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Satisfied {
    pub plugin: Plugin,
    pub reason: SatisfiedReason,
}

impl fmt::Display for Satisfied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            SatisfiedReason::AlreadyInstalled => {
                write!(f, "{} is already installed", self.plugin.name)
            }
            SatisfiedReason::InstalledDependency { required_by } => write!(
                f,
                "{} (required by {}) is already installed",
                self.plugin.name, required_by
            ),
        }
    }
}

/// A dependency whose catalog entry is older than the edge's minimum
///
/// The resolver still selects the catalog entry; this is informational.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionShortfall {
    pub name: String,
    pub required_by: String,
    pub min_version: String,
    pub catalog_version: String,
}

impl fmt::Display for VersionShortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} requires {} >= {}, but the catalog only has {}",
            self.required_by, self.name, self.min_version, self.catalog_version
        )
    }
}

/// Output of dependency resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionResult {
    /// Plugins to install, dependencies before dependents, no duplicates
    pub to_install: Vec<Plugin>,
    /// Plugins already present, in the order they were encountered
    pub satisfied: Vec<Satisfied>,
    /// Dependencies selected despite being below their minimum version
    pub shortfalls: Vec<VersionShortfall>,
}

impl ResolutionResult {
    pub fn is_satisfied(&self, name: &str) -> bool {
        self.satisfied.iter().any(|s| s.plugin.name == name)
    }

    /// Names of the plugins to install, in order
    pub fn install_order(&self) -> Vec<&str> {
        self.to_install.iter().map(|p| p.name.as_str()).collect()
    }

    /// True when nothing needs to be installed
    pub fn is_empty(&self) -> bool {
        self.to_install.is_empty()
    }
}
