//! Configuration system: TOML file + env var overrides + smart defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{EpmxError, Result};

/// Full epmx configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
#[derive(Default)]
pub struct Config {
    pub snapshot: SnapshotConfig,
    pub selection: SelectionConfig,
    pub tooltip: TooltipConfig,
}

/// Where the endpoint snapshot comes from and where it is cached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SnapshotConfig {
    /// HTTP(S) source of the SQLite snapshot.
    pub url: String,
    /// Local cache path the snapshot is downloaded to.
    pub cache_file: PathBuf,
    /// Request timeout for the snapshot download, in seconds.
    pub fetch_timeout_secs: u64,
}

/// Persisted region-selection storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SelectionConfig {
    /// JSON file holding the serialized region-name list.
    pub file: PathBuf,
}

/// Per-service tooltip fragment source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TooltipConfig {
    /// Base URL; the fragment for a service lives at `{base_url}{service}.html`.
    pub base_url: String,
    /// Master switch for fragment fetching.
    pub enabled: bool,
    /// Request timeout for fragment fetches, in seconds.
    pub fetch_timeout_secs: u64,
}

fn home_dir() -> PathBuf {
    env::var_os("HOME").map_or_else(|| PathBuf::from("/tmp"), PathBuf::from)
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            url: "https://awsipv6.neveragain.de/endpoints.sqlite".to_string(),
            cache_file: home_dir()
                .join(".local")
                .join("share")
                .join("epmx")
                .join("endpoints.sqlite"),
            fetch_timeout_secs: 30,
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            file: home_dir()
                .join(".config")
                .join("epmx")
                .join("region-selection.json"),
        }
    }
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            base_url: "https://awsipv6.neveragain.de/service/".to_string(),
            enabled: true,
            fetch_timeout_secs: 5,
        }
    }
}

impl Config {
    /// Default config file location (`~/.config/epmx/config.toml`).
    #[must_use]
    pub fn default_path() -> PathBuf {
        home_dir().join(".config").join("epmx").join("config.toml")
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist; the default path is optional and falls
    /// back to compiled defaults when absent. Env overrides apply last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(EpmxError::MissingConfig {
                        path: p.to_path_buf(),
                    });
                }
                Self::from_file(p)?
            }
            None => {
                let default = Self::default_path();
                if default.exists() {
                    Self::from_file(&default)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| EpmxError::io(path, source))?;
        Ok(toml::from_str(&content)?)
    }

    /// Apply `EPMX_*` environment-variable overrides on top of file values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = env::var("EPMX_SNAPSHOT_URL") {
            self.snapshot.url = url;
        }
        if let Ok(path) = env::var("EPMX_SNAPSHOT_CACHE") {
            self.snapshot.cache_file = PathBuf::from(path);
        }
        if let Ok(path) = env::var("EPMX_SELECTION_FILE") {
            self.selection.file = PathBuf::from(path);
        }
        if let Ok(url) = env::var("EPMX_TOOLTIP_BASE_URL") {
            self.tooltip.base_url = url;
        }
    }

    /// Reject configurations that cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.snapshot.url.is_empty() {
            return Err(EpmxError::InvalidConfig {
                details: "snapshot.url must not be empty".to_string(),
            });
        }
        if self.snapshot.cache_file.as_os_str().is_empty() {
            return Err(EpmxError::InvalidConfig {
                details: "snapshot.cache_file must not be empty".to_string(),
            });
        }
        if self.selection.file.as_os_str().is_empty() {
            return Err(EpmxError::InvalidConfig {
                details: "selection.file must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
