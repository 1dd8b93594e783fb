// src/plugin.rs

//! Plugin records and dependency edges
//!
//! A [`Plugin`] is one entry of the update-center catalog. Records are
//! immutable once built; the catalog owns them and hands out references.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A dependency edge declared by a plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Target plugin name
    pub name: String,
    /// Minimum acceptable version of the target
    #[serde(rename = "version", default)]
    pub min_version: String,
    /// Optional edges never block installation of the dependent
    #[serde(default)]
    pub optional: bool,
}

impl Dependency {
    pub fn new(name: impl Into<String>, min_version: impl Into<String>, optional: bool) -> Self {
        Self {
            name: name.into(),
            min_version: min_version.into(),
            optional,
        }
    }

    /// Shorthand for a required edge
    pub fn required(name: impl Into<String>, min_version: impl Into<String>) -> Self {
        Self::new(name, min_version, false)
    }

    /// Shorthand for an optional edge
    pub fn optional(name: impl Into<String>, min_version: impl Into<String>) -> Self {
        Self::new(name, min_version, true)
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }
}

/// One installable plugin from the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plugin {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub title: String,
    pub url: String,
    /// Declaration order is preserved
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl Plugin {
    /// Create a plugin with no dependencies; the title defaults to the name
    ///
    /// `name` is the catalog key and must not be empty.
    pub fn new(name: impl Into<String>, version: impl Into<String>, url: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            title: name.clone(),
            name,
            version: version.into(),
            url: url.into(),
            dependencies: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Iterate the required (non-optional) edges
    pub fn required_dependencies(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter().filter(|d| !d.optional)
    }

    /// On-disk filename for this plugin's artifact: the URL's final path segment
    ///
    /// Query strings and fragments are ignored. Falls back to `<name>.hpi`
    /// when the URL has no usable final segment.
    pub fn filename(&self) -> String {
        let from_url = match url::Url::parse(&self.url) {
            Ok(parsed) => parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .map(str::to_string),
            // Relative or otherwise unparseable: split the raw string
            Err(_) => self
                .url
                .split(['?', '#'])
                .next()
                .and_then(|path| path.rsplit('/').next())
                .map(str::to_string),
        };

        match from_url {
            Some(name) if !name.is_empty() => name,
            _ => format!("{}.hpi", self.name),
        }
    }

    /// One-line description used by `jpm search`
    pub fn shortform(&self) -> String {
        if self.title.is_empty() || self.title == self.name {
            format!("{} v{}", self.name, self.version)
        } else {
            format!("{} ({}) v{}", self.name, self.title, self.version)
        }
    }

    /// Title for user-facing messages, falling back to the name
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.name
        } else {
            &self.title
        }
    }
}

impl fmt::Display for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_from_catalog_json() {
        let data = r#"{"name":"ssh-credentials","optional":false,"version":"1.5.1"}"#;
        let dep: Dependency = serde_json::from_str(data).unwrap();

        assert_eq!(dep.name, "ssh-credentials");
        assert_eq!(dep.min_version, "1.5.1");
        assert!(!dep.is_optional());
    }

    #[test]
    fn test_dependency_optional_defaults_false() {
        let dep: Dependency = serde_json::from_str(r#"{"name":"git","version":"1.0"}"#).unwrap();
        assert!(!dep.optional);
    }

    #[test]
    fn test_filename_from_url() {
        let plugin = Plugin::new("git", "2.0", "https://example/dl/git.hpi");
        assert_eq!(plugin.filename(), "git.hpi");
    }

    #[test]
    fn test_filename_ignores_query_string() {
        let plugin = Plugin::new("git", "2.0", "https://example/dl/git.hpi?mirror=eu#top");
        assert_eq!(plugin.filename(), "git.hpi");
    }

    #[test]
    fn test_filename_relative_url() {
        let plugin = Plugin::new("ant", "1.2", "download/plugins/ant/1.2/ant.hpi");
        assert_eq!(plugin.filename(), "ant.hpi");
    }

    #[test]
    fn test_filename_fallback_when_url_ends_in_slash() {
        let plugin = Plugin::new("ant", "1.2", "https://example/dl/");
        assert_eq!(plugin.filename(), "ant.hpi");
    }

    #[test]
    fn test_required_dependencies_skips_optional() {
        let plugin = Plugin::new("git", "2.0", "https://example/git.hpi")
            .with_dependency(Dependency::required("scm-api", "1.0"))
            .with_dependency(Dependency::optional("token-macro", "1.5"));

        let names: Vec<_> = plugin.required_dependencies().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["scm-api"]);
    }

    #[test]
    fn test_shortform() {
        let plugin = Plugin::new("git", "2.0", "https://example/git.hpi").with_title("Git plugin");
        assert_eq!(plugin.shortform(), "git (Git plugin) v2.0");

        let bare = Plugin::new("ant", "1.2", "https://example/ant.hpi");
        assert_eq!(bare.shortform(), "ant v1.2");
    }
}
