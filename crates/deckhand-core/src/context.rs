//! Application context for unified dependency injection.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::apps::{HttpDownloader, IndexCache, ManifestResolver, SourceFetcher};
use crate::config::{CatalogConfig, ConfigStore, DataLayout, DeckhandConfig};
use crate::device::AdbBridge;
use crate::fs::resolve_against;

/// Flags shared by every command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Report what would happen without mutating the device
    pub dry_run: bool,
    /// Skip confirmations and bypass download caches
    pub force: bool,
}

impl RunOptions {
    pub fn new(dry_run: bool, force: bool) -> Self {
        Self { dry_run, force }
    }
}

/// Unified application context.
///
/// Frontends create this once and pass it to commands.
#[derive(Debug, Clone)]
pub struct AppContext {
    config: DeckhandConfig,
    config_path: Option<PathBuf>,
    layout: DataLayout,
}

impl AppContext {
    /// Load configuration from the standard locations.
    pub fn with_defaults(explicit_config: Option<PathBuf>) -> anyhow::Result<Self> {
        let cwd = std::env::current_dir().context("Failed to determine current directory")?;
        let store = ConfigStore::from_defaults(explicit_config, &cwd);
        let (config, config_path) = store.load()?;
        Self::from_config(config, config_path, &cwd)
    }

    /// Build a context from an already-loaded config.
    ///
    /// A relative `data_dir` resolves against the config file's directory,
    /// or `cwd` when there is no config file.
    pub fn from_config(
        config: DeckhandConfig,
        config_path: Option<PathBuf>,
        cwd: &Path,
    ) -> anyhow::Result<Self> {
        let base = config_path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| cwd.to_path_buf());

        let data_dir = match &config.data_dir {
            Some(dir) => resolve_against(&base, dir),
            None => cwd.to_path_buf(),
        };

        let cache_dir = match &config.cache_dir {
            Some(dir) => resolve_against(&base, dir),
            None => dirs::cache_dir()
                .map(|p| p.join("deckhand"))
                .ok_or_else(|| anyhow::anyhow!("Could not determine cache directory"))?,
        };

        Ok(Self {
            config,
            config_path,
            layout: DataLayout::new(data_dir, cache_dir),
        })
    }

    /// Context over explicit directories with default settings (for testing).
    pub fn with_layout(layout: DataLayout) -> Self {
        Self {
            config: DeckhandConfig::new(),
            config_path: None,
            layout,
        }
    }

    pub fn config(&self) -> &DeckhandConfig {
        &self.config
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    pub fn catalog(&self) -> &CatalogConfig {
        &self.config.catalog
    }

    /// Device serial pinned in config, if any.
    pub fn configured_serial(&self) -> Option<&str> {
        self.config.adb.serial.as_deref()
    }

    /// Get an AdbBridge for the configured adb binary.
    pub fn adb_bridge(&self) -> AdbBridge {
        AdbBridge::new(self.config.adb.path.clone())
    }

    /// Get a ManifestResolver over the app-set directory.
    pub fn manifest_resolver(&self) -> ManifestResolver {
        ManifestResolver::new(self.layout.app_sets_dir())
    }

    /// Get the catalog index cache.
    pub fn index_cache(&self) -> IndexCache {
        IndexCache::new(
            self.layout.catalog_index(),
            self.config.catalog.index_url.clone(),
            std::time::Duration::from_secs(self.config.catalog.index_ttl_secs),
        )
    }

    /// Get a SourceFetcher backed by HTTP downloads.
    pub fn source_fetcher(&self, force: bool) -> anyhow::Result<SourceFetcher<HttpDownloader>> {
        let downloader = HttpDownloader::new().context("Failed to initialize HTTP client")?;
        Ok(self.source_fetcher_with(downloader, force))
    }

    /// Get a SourceFetcher with a custom downloader.
    pub fn source_fetcher_with<D>(&self, downloader: D, force: bool) -> SourceFetcher<D>
    where
        D: crate::apps::Downloader,
    {
        SourceFetcher::new(
            self.layout.local_apk_dir(),
            self.layout.download_dir(),
            self.index_cache(),
            self.config.catalog.repo_url.clone(),
            downloader,
        )
        .with_force(force)
    }
}
