// src/error.rs

//! Error types for catalog loading, resolution and installation

use thiserror::Error;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by jpm
#[derive(Error, Debug)]
pub enum Error {
    /// Catalog file does not exist
    #[error("`{0}` is not a valid file (run `jpm update` first)")]
    MissingCatalog(String),

    /// Catalog document is empty or not parseable after stripping the envelope
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    /// An individual catalog entry lacks a required field
    #[error("malformed catalog entry: {0}")]
    MalformedCatalog(String),

    /// One or more requested plugin names are not in the catalog
    #[error("unknown plugin(s): {}", .0.join(", "))]
    UnknownPlugin(Vec<String>),

    /// A required dependency edge points at a plugin missing from the catalog
    #[error("plugin '{required_by}' requires '{name}', which is not in the catalog")]
    MissingDependency { name: String, required_by: String },

    /// A cycle of required dependency edges
    #[error("dependency cycle: {}", .0.join(" -> "))]
    DependencyCycle(Vec<String>),

    /// Two different plugin records were chosen under one name
    #[error("conflicting versions selected for plugin '{0}'")]
    ConflictingVersion(String),

    /// Downloading an artifact failed
    #[error("fetch failed: {0}")]
    FetchError(String),

    /// Persisting an artifact failed
    #[error("write failed: {0}")]
    WriteError(String),

    /// A network command was invoked under --offline
    #[error("`{0}` cannot be run offline")]
    Offline(String),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config file is not valid TOML
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid search pattern
    #[error("invalid search pattern: {0}")]
    Regex(#[from] regex::Error),
}

impl Error {
    /// True for errors that abort a whole batch before any side effect
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownPlugin(_)
                | Self::MissingDependency { .. }
                | Self::DependencyCycle(_)
                | Self::ConflictingVersion(_)
        )
    }
}
