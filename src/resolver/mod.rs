// src/resolver/mod.rs

//! Dependency resolution
//!
//! Turns a list of requested plugin names into an ordered, duplicate-free
//! install set. The walk is a depth-first, post-order traversal of the
//! dependency edges, so every dependency lands before its dependents.
//!
//! Rules applied at each plugin:
//! - Already installed: reported as satisfied, its own dependencies are not
//!   walked (an installed plugin is assumed to have what it needs).
//! - Already on the walk stack: a cycle. If every edge on the cycle is
//!   optional, the closing edge is dropped; otherwise resolution fails.
//! - Optional edge to a plugin missing from the catalog: skipped.
//! - Optional edge whose subtree fails to resolve: the edge is skipped and
//!   everything the failed subtree had recorded is rolled back. A cycle that
//!   runs back above the optional edge still fails.
//! - Required edge to a plugin missing from the catalog: resolution fails.
//!
//! The catalog's entry is used for each dependency regardless of the edge's
//! minimum version. Entries that are older than the minimum are recorded as
//! [`VersionShortfall`]s and logged, not rejected.

mod plan;

pub use plan::{InstalledSet, ResolutionResult, Satisfied, SatisfiedReason, VersionShortfall};

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::plugin::{Dependency, Plugin};
use crate::version::satisfies_minimum;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Frame on the walk stack
struct Frame {
    name: String,
    /// Whether the edge that led here was optional
    via_optional: bool,
}

/// Lengths of the walk state before an optional edge is followed
struct Checkpoint {
    to_install: usize,
    satisfied: usize,
    shortfalls: usize,
    stack: usize,
}

/// Working state for one resolution
#[derive(Default)]
struct WalkState<'a> {
    to_install: Vec<Plugin>,
    resolved: HashSet<String>,
    stack: Vec<Frame>,
    decided: HashMap<String, &'a Plugin>,
    satisfied: Vec<Satisfied>,
    satisfied_names: HashSet<String>,
    shortfalls: Vec<VersionShortfall>,
}

impl WalkState<'_> {
    fn record_satisfied(&mut self, plugin: &Plugin, parent: Option<&Plugin>) {
        if !self.satisfied_names.insert(plugin.name.clone()) {
            return;
        }
        let reason = match parent {
            Some(parent) => SatisfiedReason::InstalledDependency {
                required_by: parent.name.clone(),
            },
            None => SatisfiedReason::AlreadyInstalled,
        };
        self.satisfied.push(Satisfied {
            plugin: plugin.clone(),
            reason,
        });
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            to_install: self.to_install.len(),
            satisfied: self.satisfied.len(),
            shortfalls: self.shortfalls.len(),
            stack: self.stack.len(),
        }
    }

    /// Forget everything recorded since `checkpoint`
    ///
    /// Names enter `decided` together with a stack frame and `resolved`
    /// together with `to_install`, so the vectors say what to remove.
    fn rollback(&mut self, checkpoint: &Checkpoint) {
        for frame in self.stack.drain(checkpoint.stack..) {
            self.decided.remove(&frame.name);
        }
        for plugin in self.to_install.drain(checkpoint.to_install..) {
            self.resolved.remove(&plugin.name);
            self.decided.remove(&plugin.name);
        }
        for satisfied in self.satisfied.drain(checkpoint.satisfied..) {
            self.satisfied_names.remove(&satisfied.plugin.name);
        }
        self.shortfalls.truncate(checkpoint.shortfalls);
    }

    /// Whether a cycle reaches a frame pushed before `checkpoint`
    fn cycle_escapes(&self, path: &[String], checkpoint: &Checkpoint) -> bool {
        path.first().is_some_and(|start| {
            self.stack[..checkpoint.stack]
                .iter()
                .any(|frame| &frame.name == start)
        })
    }

    fn into_result(self) -> ResolutionResult {
        ResolutionResult {
            to_install: self.to_install,
            satisfied: self.satisfied,
            shortfalls: self.shortfalls,
        }
    }
}

/// Computes install sets against a catalog and installed-set snapshot
pub struct Resolver<'a> {
    catalog: &'a Catalog,
    installed: &'a InstalledSet,
    include_optional: bool,
}

impl<'a> Resolver<'a> {
    pub fn new(catalog: &'a Catalog, installed: &'a InstalledSet) -> Self {
        Self {
            catalog,
            installed,
            include_optional: true,
        }
    }

    /// Whether optional dependencies present in the catalog are installed too
    ///
    /// Defaults to true.
    pub fn include_optional(mut self, include: bool) -> Self {
        self.include_optional = include;
        self
    }

    /// Resolve the requested names into an ordered install set
    ///
    /// Every requested name is checked before any walking starts; all
    /// unknown names are reported together.
    pub fn compute<S: AsRef<str>>(&self, requested: &[S]) -> Result<ResolutionResult> {
        let mut unknown: Vec<String> = Vec::new();
        for name in requested {
            let name = name.as_ref();
            if !self.catalog.contains(name) && !unknown.iter().any(|u| u == name) {
                unknown.push(name.to_string());
            }
        }
        if !unknown.is_empty() {
            return Err(Error::UnknownPlugin(unknown));
        }

        let mut state = WalkState::default();
        for name in requested {
            if let Some(plugin) = self.catalog.lookup(name.as_ref()) {
                self.visit(plugin, None, &mut state)?;
            }
        }

        let result = state.into_result();
        debug!(
            "Resolved {} request(s): install [{}], {} already satisfied",
            requested.len(),
            result.install_order().join(", "),
            result.satisfied.len()
        );
        Ok(result)
    }

    fn visit(
        &self,
        plugin: &'a Plugin,
        via: Option<(&'a Plugin, &'a Dependency)>,
        state: &mut WalkState<'a>,
    ) -> Result<()> {
        if self.installed.contains(&plugin.name) {
            debug!("{} is already installed, not descending", plugin.name);
            state.record_satisfied(plugin, via.map(|(parent, _)| parent));
            return Ok(());
        }

        if let Some(pos) = state.stack.iter().position(|f| f.name == plugin.name) {
            let closing_optional = via.is_some_and(|(_, dep)| dep.optional);
            let all_optional =
                closing_optional && state.stack[pos + 1..].iter().all(|f| f.via_optional);

            if all_optional {
                debug!(
                    "Breaking optional cycle at {} -> {}",
                    state.stack.last().map(|f| f.name.as_str()).unwrap_or_default(),
                    plugin.name
                );
                return Ok(());
            }

            let mut path: Vec<String> = state.stack[pos..].iter().map(|f| f.name.clone()).collect();
            path.push(plugin.name.clone());
            return Err(Error::DependencyCycle(path));
        }

        // One name maps to one catalog record while the catalog is borrowed,
        // so this only trips if lookups ever stop going through `Catalog`.
        if let Some(existing) = state.decided.get(&plugin.name) {
            if *existing != plugin {
                return Err(Error::ConflictingVersion(plugin.name.clone()));
            }
        }

        if state.resolved.contains(&plugin.name) {
            return Ok(());
        }

        state.decided.insert(plugin.name.clone(), plugin);
        state.stack.push(Frame {
            name: plugin.name.clone(),
            via_optional: via.is_some_and(|(_, dep)| dep.optional),
        });

        for dep in &plugin.dependencies {
            if dep.optional && !self.include_optional {
                continue;
            }

            let Some(target) = self.catalog.lookup(&dep.name) else {
                if dep.optional {
                    debug!(
                        "Optional dependency {} of {} is not in the catalog, skipping",
                        dep.name, plugin.name
                    );
                    continue;
                }
                return Err(Error::MissingDependency {
                    name: dep.name.clone(),
                    required_by: plugin.name.clone(),
                });
            };

            let checkpoint = state.checkpoint();

            if !satisfies_minimum(&target.version, &dep.min_version) {
                let shortfall = VersionShortfall {
                    name: target.name.clone(),
                    required_by: plugin.name.clone(),
                    min_version: dep.min_version.clone(),
                    catalog_version: target.version.clone(),
                };
                warn!("{}", shortfall);
                state.shortfalls.push(shortfall);
            }

            match self.visit(target, Some((plugin, dep)), state) {
                Ok(()) => {}
                Err(Error::DependencyCycle(path)) if state.cycle_escapes(&path, &checkpoint) => {
                    return Err(Error::DependencyCycle(path));
                }
                Err(e) if dep.optional => {
                    warn!(
                        "Skipping optional dependency {} of {}: {}",
                        dep.name, plugin.name, e
                    );
                    state.rollback(&checkpoint);
                }
                Err(e) => return Err(e),
            }
        }

        state.stack.pop();
        state.resolved.insert(plugin.name.clone());
        state.to_install.push(plugin.clone());
        Ok(())
    }
}
