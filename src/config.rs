// src/config.rs

//! jpm configuration
//!
//! Settings come from an optional TOML file (`--config PATH`, otherwise
//! `<config_dir>/jpm/config.toml`). Every key is optional:
//!
//! ```toml
//! jenkins_home = "/var/lib/jenkins"
//! plugins_dir = "/var/lib/jenkins/plugins"
//! repository_path = "/home/me/.cache/jpm/update-center.json"
//! update_center_url = "https://updates.jenkins-ci.org/update-center.json"
//! http_timeout_secs = 30
//! parallel_downloads = false
//! ```
//!
//! `JENKINS_HOME` in the environment overrides `jenkins_home` from the file.
//! `plugins_dir` defaults to `<jenkins_home>/plugins`.

use crate::error::{Error, Result};
use crate::plugins_dir::PluginsDir;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Default update-center document
pub const DEFAULT_UPDATE_CENTER_URL: &str = "https://updates.jenkins-ci.org/update-center.json";

/// Default Jenkins home directory
pub const DEFAULT_JENKINS_HOME: &str = "/var/lib/jenkins";

/// Default HTTP timeout in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Environment variable overriding `jenkins_home`
pub const JENKINS_HOME_ENV: &str = "JENKINS_HOME";

/// On-disk shape of the config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub jenkins_home: Option<PathBuf>,
    pub plugins_dir: Option<PathBuf>,
    pub repository_path: Option<PathBuf>,
    pub update_center_url: Option<String>,
    pub http_timeout_secs: Option<u64>,
    pub parallel_downloads: Option<bool>,
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub jenkins_home: PathBuf,
    pub plugins_dir: PathBuf,
    /// Local copy of the update-center catalog
    pub repository_path: PathBuf,
    pub update_center_url: String,
    pub http_timeout: Duration,
    pub parallel_downloads: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_file(ConfigFile::default(), None)
    }
}

impl Config {
    /// Load configuration from `path`, or from the default location if present
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let env_home = std::env::var_os(JENKINS_HOME_ENV).map(PathBuf::from);

        let file = match path {
            Some(path) => {
                if !path.is_file() {
                    return Err(Error::Config(format!(
                        "config file {} does not exist",
                        path.display()
                    )));
                }
                Self::read_file(path)?
            }
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::read_file(&path)?,
                _ => ConfigFile::default(),
            },
        };

        Ok(Self::from_file(file, env_home))
    }

    fn read_file(path: &Path) -> Result<ConfigFile> {
        debug!("Reading config from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse config file contents
    pub fn parse(contents: &str) -> Result<ConfigFile> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply defaults and the environment override to a config file
    pub fn from_file(file: ConfigFile, env_home: Option<PathBuf>) -> Self {
        let jenkins_home = env_home
            .or(file.jenkins_home)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_JENKINS_HOME));
        let plugins_dir = file
            .plugins_dir
            .unwrap_or_else(|| jenkins_home.join("plugins"));
        let repository_path = file.repository_path.unwrap_or_else(default_repository_path);

        Self {
            jenkins_home,
            plugins_dir,
            repository_path,
            update_center_url: file
                .update_center_url
                .unwrap_or_else(|| DEFAULT_UPDATE_CENTER_URL.to_string()),
            http_timeout: Duration::from_secs(
                file.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
            ),
            parallel_downloads: file.parallel_downloads.unwrap_or(false),
        }
    }

    /// True when the Jenkins home directory exists
    pub fn jenkins_installed(&self) -> bool {
        self.jenkins_home.is_dir()
    }

    pub fn plugins(&self) -> PluginsDir {
        PluginsDir::new(&self.plugins_dir)
    }
}

/// `<config_dir>/jpm/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("jpm").join("config.toml"))
}

/// `<cache_dir>/jpm/update-center.json`, falling back to the working directory
pub fn default_repository_path() -> PathBuf {
    dirs::cache_dir()
        .map(|d| d.join("jpm"))
        .unwrap_or_else(|| PathBuf::from(".jpm"))
        .join("update-center.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::from_file(ConfigFile::default(), None);
        assert_eq!(config.jenkins_home, PathBuf::from(DEFAULT_JENKINS_HOME));
        assert_eq!(config.plugins_dir, PathBuf::from("/var/lib/jenkins/plugins"));
        assert_eq!(config.update_center_url, DEFAULT_UPDATE_CENTER_URL);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert!(!config.parallel_downloads);
        assert!(config.repository_path.ends_with("update-center.json"));
    }

    #[test]
    fn test_env_home_overrides_file() {
        let file = ConfigFile {
            jenkins_home: Some(PathBuf::from("/srv/jenkins")),
            ..Default::default()
        };
        let config = Config::from_file(file, Some(PathBuf::from("/opt/jenkins")));
        assert_eq!(config.jenkins_home, PathBuf::from("/opt/jenkins"));
        assert_eq!(config.plugins_dir, PathBuf::from("/opt/jenkins/plugins"));
    }

    #[test]
    fn test_explicit_plugins_dir_kept() {
        let file = ConfigFile {
            plugins_dir: Some(PathBuf::from("/data/plugins")),
            ..Default::default()
        };
        let config = Config::from_file(file, Some(PathBuf::from("/opt/jenkins")));
        assert_eq!(config.plugins_dir, PathBuf::from("/data/plugins"));
    }

    #[test]
    fn test_parse_toml() {
        let file = Config::parse(
            r#"
            update_center_url = "https://mirror.example/uc.json"
            http_timeout_secs = 5
            parallel_downloads = true
            "#,
        )
        .unwrap();
        let config = Config::from_file(file, None);
        assert_eq!(config.update_center_url, "https://mirror.example/uc.json");
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert!(config.parallel_downloads);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(matches!(Config::parse("colour = true"), Err(Error::Toml(_))));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let result = Config::load(Some(Path::new("/nonexistent/jpm.toml")));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_load_explicit_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "repository_path = \"/tmp/uc.json\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.repository_path, PathBuf::from("/tmp/uc.json"));
    }

    #[test]
    fn test_jenkins_installed() {
        let temp = TempDir::new().unwrap();
        let config = Config::from_file(ConfigFile::default(), Some(temp.path().to_path_buf()));
        assert!(config.jenkins_installed());

        let missing = Config::from_file(ConfigFile::default(), Some(PathBuf::from("/nonexistent")));
        assert!(!missing.jenkins_installed());
    }
}
