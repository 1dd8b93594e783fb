// src/plugins_dir.rs

//! Installed-plugin directory
//!
//! One artifact file per plugin, named after the artifact URL's basename.
//! The installed set is derived from the file stems of `.hpi` and `.jpi`
//! files. There is no locking: another process writing into the same
//! directory concurrently is not guarded against.

use crate::error::{Error, Result};
use crate::installer::PluginWriter;
use crate::resolver::InstalledSet;
use regex::Regex;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// File extensions recognised as plugin artifacts
const PLUGIN_EXTENSIONS: &[&str] = &["hpi", "jpi"];

/// Handle on a plugins directory
#[derive(Debug, Clone)]
pub struct PluginsDir {
    path: PathBuf,
}

impl PluginsDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of installed plugin names
    ///
    /// A missing directory yields an empty set.
    pub fn list_installed_names(&self) -> Result<InstalledSet> {
        if !self.path.is_dir() {
            debug!("Plugins directory {} does not exist", self.path.display());
            return Ok(InstalledSet::new());
        }

        let mut installed = InstalledSet::new();
        for entry in fs::read_dir(&self.path)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let is_plugin = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| PLUGIN_EXTENSIONS.contains(&ext));
            if !is_plugin {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                installed.insert(stem);
            }
        }

        debug!(
            "Found {} installed plugins in {}",
            installed.len(),
            self.path.display()
        );
        Ok(installed)
    }

    pub fn has_plugins(&self) -> Result<bool> {
        Ok(!self.list_installed_names()?.is_empty())
    }

    /// Installed names matching `term` (all when `None`), sorted
    pub fn installed_matching(&self, term: Option<&str>) -> Result<Vec<String>> {
        let pattern = term.map(Regex::new).transpose()?;
        let installed = self.list_installed_names()?;
        Ok(installed
            .iter()
            .filter(|name| pattern.as_ref().is_none_or(|re| re.is_match(name)))
            .map(str::to_string)
            .collect())
    }

    /// Write an artifact atomically: temp file in the same directory, then rename
    pub fn write_artifact(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        if filename.is_empty() || filename.contains(['/', '\\']) || filename == ".." {
            return Err(Error::WriteError(format!(
                "refusing to write artifact with unsafe filename '{filename}'"
            )));
        }

        fs::create_dir_all(&self.path).map_err(|e| {
            Error::WriteError(format!("failed to create {}: {e}", self.path.display()))
        })?;

        let dest = self.path.join(filename);
        let mut temp = NamedTempFile::new_in(&self.path)
            .map_err(|e| Error::WriteError(format!("failed to create temp file: {e}")))?;
        temp.write_all(bytes)
            .map_err(|e| Error::WriteError(format!("failed to write {filename}: {e}")))?;
        temp.persist(&dest)
            .map_err(|e| Error::WriteError(format!("failed to move {filename} into place: {e}")))?;

        debug!("Wrote {} bytes to {}", bytes.len(), dest.display());
        Ok(dest)
    }
}

impl PluginWriter for PluginsDir {
    fn write(&self, filename: &str, bytes: &[u8]) -> Result<()> {
        self.write_artifact(filename, bytes).map(|_| ())
    }
}
