// src/catalog.rs

//! Plugin catalog
//!
//! The catalog is the in-memory index of every installable plugin described
//! by one update-center document. Entries are keyed by name; enumeration
//! order is insertion order, and re-adding a name replaces the record in
//! place without moving it.
//!
//! # Document format
//!
//! The update center serves JSONP: the first and last lines are a wrapper
//! (`updateCenter.post(` / `);`) and everything between them is one JSON
//! object whose `plugins` field maps plugin names to entries:
//!
//! ```text
//! updateCenter.post(
//! {"plugins": {"git": {"name": "git", "version": "2.0", "url": "...",
//!   "dependencies": [{"name": "scm-api", "version": "1.0", "optional": false}]}}}
//! );
//! ```
//!
//! A document that is already bare JSON (first line starts with `{`) is
//! accepted as-is.

use crate::error::{Error, Result};
use crate::plugin::{Dependency, Plugin};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Top-level shape of the catalog document
#[derive(Debug, Deserialize)]
struct CatalogDocument {
    plugins: Option<serde_json::Map<String, serde_json::Value>>,
}

/// A catalog entry before required fields are validated
#[derive(Debug, Deserialize)]
struct RawPlugin {
    name: Option<String>,
    version: Option<String>,
    title: Option<String>,
    url: Option<String>,
    #[serde(default)]
    dependencies: Vec<Dependency>,
}

impl RawPlugin {
    fn into_plugin(self, key: &str) -> Result<Plugin> {
        let name = match self.name {
            Some(name) if !name.is_empty() => name,
            _ => {
                return Err(Error::MalformedCatalog(format!(
                    "entry '{key}' has no `name`"
                )));
            }
        };
        let url = match self.url {
            Some(url) if !url.is_empty() => url,
            _ => {
                return Err(Error::MalformedCatalog(format!(
                    "plugin '{name}' has no `url`"
                )));
            }
        };
        if let Some(dep) = self.dependencies.iter().find(|d| d.name.is_empty()) {
            return Err(Error::MalformedCatalog(format!(
                "plugin '{name}' declares a dependency without a name (min version '{}')",
                dep.min_version
            )));
        }

        Ok(Plugin {
            title: self.title.unwrap_or_else(|| name.clone()),
            version: self.version.unwrap_or_default(),
            name,
            url,
            dependencies: self.dependencies,
        })
    }
}

/// Name-keyed collection of plugin records
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    plugins: Vec<Plugin>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a plugin, replacing any existing record with the same name
    ///
    /// The name must not be empty.
    pub fn add(&mut self, plugin: Plugin) -> &mut Self {
        debug_assert!(!plugin.name.is_empty(), "catalog entries need a name");
        match self.index.get(&plugin.name) {
            Some(&pos) => {
                debug!("Replacing catalog entry for {}", plugin.name);
                self.plugins[pos] = plugin;
            }
            None => {
                self.index.insert(plugin.name.clone(), self.plugins.len());
                self.plugins.push(plugin);
            }
        }
        self
    }

    /// Exact-name lookup
    pub fn lookup(&self, name: &str) -> Option<&Plugin> {
        self.index.get(name).map(|&pos| &self.plugins[pos])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Iterate all plugins in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Plugin> {
        self.plugins.iter()
    }

    /// Lazily yield every plugin whose name matches `pattern`
    ///
    /// The match is unanchored, so a plain word behaves as a substring
    /// search. Calling again restarts the sequence.
    pub fn search<'a, 'p>(&'a self, pattern: &'p Regex) -> impl Iterator<Item = &'a Plugin> + 'p
    where
        'a: 'p,
    {
        self.plugins.iter().filter(move |p| pattern.is_match(&p.name))
    }

    /// Compile `term` as a regular expression and collect the matches
    ///
    /// The returned records borrow the catalog only.
    pub fn search_term(&self, term: &str) -> Result<Vec<&Plugin>> {
        let pattern = Regex::new(term)?;
        Ok(self
            .plugins
            .iter()
            .filter(|p| pattern.is_match(&p.name))
            .collect())
    }

    /// Parse a catalog document
    ///
    /// Either every entry loads or an error is returned; a partially
    /// populated catalog is never produced.
    pub fn from_document(document: &str) -> Result<Self> {
        if document.trim().is_empty() {
            return Err(Error::InvalidCatalog("catalog document is empty".to_string()));
        }

        let body = strip_envelope(document);
        if body.trim().is_empty() {
            return Err(Error::InvalidCatalog(
                "catalog document has no content inside its wrapper".to_string(),
            ));
        }

        let parsed: CatalogDocument = serde_json::from_str(&body)
            .map_err(|e| Error::InvalidCatalog(format!("failed to parse catalog JSON: {e}")))?;
        let entries = parsed
            .plugins
            .ok_or_else(|| Error::InvalidCatalog("catalog has no `plugins` field".to_string()))?;

        let mut catalog = Self::new();
        for (key, value) in entries {
            let raw: RawPlugin = serde_json::from_value(value)
                .map_err(|e| Error::MalformedCatalog(format!("entry '{key}': {e}")))?;
            catalog.add(raw.into_plugin(&key)?);
        }

        debug!("Parsed {} catalog entries", catalog.len());
        Ok(catalog)
    }

    /// Load a catalog from a file on disk
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::MissingCatalog(path.display().to_string()));
        }

        let bytes = std::fs::read(path)?;
        let document = String::from_utf8_lossy(&bytes);
        let catalog = Self::from_document(&document)?;
        info!("Loaded {} plugins from {}", catalog.len(), path.display());
        Ok(catalog)
    }
}

/// Drop the JSONP wrapper lines around the JSON body
fn strip_envelope(document: &str) -> String {
    let lines: Vec<&str> = document.lines().collect();
    if lines
        .first()
        .is_some_and(|first| first.trim_start().starts_with('{'))
    {
        return document.to_string();
    }
    if lines.len() < 3 {
        return String::new();
    }
    lines[1..lines.len() - 1].join("\n")
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Plugin;
    type IntoIter = std::slice::Iter<'a, Plugin>;

    fn into_iter(self) -> Self::IntoIter {
        self.plugins.iter()
    }
}
