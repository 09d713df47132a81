//! Configuration for deckhand.toml
//!
//! Lookup order: explicit `--config` path, `./deckhand.toml`, then
//! `<config_dir>/deckhand/deckhand.toml`. Every field is optional.

pub mod parser;
pub mod paths;
pub mod store;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use paths::DataLayout;
pub use store::ConfigStore;

pub const DEFAULT_INDEX_URL: &str = "https://f-droid.org/repo/index-v1.json";
pub const DEFAULT_REPO_URL: &str = "https://f-droid.org/repo";
pub const DEFAULT_INDEX_TTL_SECS: u64 = 3600;

/// Root configuration structure for deckhand.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DeckhandConfig {
    /// Root of `lists/`, `apps/` and `settings/` (relative to the config file)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Download cache (defaults to the platform cache dir)
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    #[serde(default)]
    pub adb: AdbConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Device bridge settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdbConfig {
    /// adb executable name or path
    #[serde(default = "default_adb_path")]
    pub path: PathBuf,

    /// Serial of the device to use when several are attached
    #[serde(default)]
    pub serial: Option<String>,
}

impl Default for AdbConfig {
    fn default() -> Self {
        Self {
            path: default_adb_path(),
            serial: None,
        }
    }
}

/// Remote catalog settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Catalog index document
    #[serde(default = "default_index_url")]
    pub index_url: String,

    /// Base URL release files are served from
    #[serde(default = "default_repo_url")]
    pub repo_url: String,

    /// Refetch the cached index when older than this
    #[serde(default = "default_index_ttl_secs")]
    pub index_ttl_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            index_url: default_index_url(),
            repo_url: default_repo_url(),
            index_ttl_secs: default_index_ttl_secs(),
        }
    }
}

fn default_adb_path() -> PathBuf {
    PathBuf::from("adb")
}

fn default_index_url() -> String {
    DEFAULT_INDEX_URL.to_string()
}

fn default_repo_url() -> String {
    DEFAULT_REPO_URL.to_string()
}

fn default_index_ttl_secs() -> u64 {
    DEFAULT_INDEX_TTL_SECS
}

/// Config file read, parse, or validation failure.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl DeckhandConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate field values after parsing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("catalog.index_url", &self.catalog.index_url),
            ("catalog.repo_url", &self.catalog.repo_url),
        ] {
            let parsed = url::Url::parse(value)
                .map_err(|e| ConfigError::Invalid(format!("{field} '{value}': {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https" | "file") {
                return Err(ConfigError::Invalid(format!(
                    "{field} '{value}': unsupported scheme '{}'",
                    parsed.scheme()
                )));
            }
        }

        if self.catalog.index_ttl_secs == 0 {
            return Err(ConfigError::Invalid(
                "catalog.index_ttl_secs must be greater than zero".to_string(),
            ));
        }

        if self.adb.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("adb.path must not be empty".to_string()));
        }

        Ok(())
    }
}
