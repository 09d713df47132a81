//! Remote catalog index with a time-based local cache.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::Context;
use serde::Deserialize;

use super::Downloader;

/// One published version of a package.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogVersion {
    /// Release file name in the repository
    #[serde(rename = "apkName")]
    pub apk_name: String,
    #[serde(rename = "versionCode", default)]
    pub version_code: u64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawIndex {
    /// index-v1 layout: versions live under a top-level `packages` object
    Wrapped {
        packages: HashMap<String, Vec<CatalogVersion>>,
    },
    Bare(HashMap<String, Vec<CatalogVersion>>),
}

/// Package identifier -> versions, newest first.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    packages: HashMap<String, Vec<CatalogVersion>>,
}

impl CatalogIndex {
    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let raw: RawIndex =
            serde_json::from_str(content).context("Failed to parse catalog index")?;
        let packages = match raw {
            RawIndex::Wrapped { packages } | RawIndex::Bare(packages) => packages,
        };
        Ok(Self { packages })
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog index: {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse catalog index: {}", path.display()))
    }

    /// Release file name of the first listed (latest) version.
    pub fn latest_filename(&self, package: &str) -> Option<&str> {
        self.packages
            .get(package)
            .and_then(|versions| versions.first())
            .map(|v| v.apk_name.as_str())
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Cached copy of the catalog index on disk.
#[derive(Debug, Clone)]
pub struct IndexCache {
    path: PathBuf,
    url: String,
    ttl: Duration,
}

impl IndexCache {
    pub fn new(path: PathBuf, url: String, ttl: Duration) -> Self {
        Self { path, url, ttl }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when the cached file exists and is younger than the TTL.
    pub fn is_fresh(&self) -> bool {
        let Ok(modified) = std::fs::metadata(&self.path).and_then(|m| m.modified()) else {
            return false;
        };
        match SystemTime::now().duration_since(modified) {
            Ok(age) => age < self.ttl,
            // mtime in the future
            Err(_) => true,
        }
    }

    /// Download the index next to the cache and replace it only if it parses.
    fn refresh<D: Downloader>(&self, downloader: &D) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let staging = self.staging_path();

        let result = downloader
            .download(&self.url, &staging)
            .map_err(anyhow::Error::from)
            .and_then(|()| CatalogIndex::load(&staging).map(|_| ()));
        if let Err(e) = result {
            if staging.exists() {
                let _ = std::fs::remove_file(&staging);
            }
            return Err(e);
        }

        std::fs::rename(&staging, &self.path).with_context(|| {
            format!("Failed to replace catalog index: {}", self.path.display())
        })
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "index.json".into());
        name.push(".partial");
        self.path.with_file_name(name)
    }

    /// Return the index, refreshing the cached copy first if it is stale.
    ///
    /// A failed refresh falls back to the stale copy. `None` means no usable
    /// index at all; callers then guess download URLs.
    pub fn load_or_refresh<D: Downloader>(&self, downloader: &D, force: bool) -> Option<CatalogIndex> {
        if force || !self.is_fresh() {
            tracing::info!(url = %self.url, "refreshing catalog index");
            if let Err(e) = self.refresh(downloader) {
                tracing::warn!(error = %format!("{e:#}"), "catalog index refresh failed");
            }
        }

        if !self.path.is_file() {
            tracing::warn!("no catalog index available");
            return None;
        }

        match CatalogIndex::load(&self.path) {
            Ok(index) => {
                tracing::debug!(packages = index.len(), "catalog index loaded");
                Some(index)
            }
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "unusable catalog index");
                None
            }
        }
    }
}
