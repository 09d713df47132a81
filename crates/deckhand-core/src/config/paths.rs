//! Data and cache directory layout.

use std::path::{Path, PathBuf};

use crate::debloat::Tier;

/// Where lists, manifests, settings profiles and caches live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    data_dir: PathBuf,
    cache_dir: PathBuf,
}

impl DataLayout {
    pub fn new(data_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            cache_dir: cache_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn lists_dir(&self) -> PathBuf {
        self.data_dir.join("lists")
    }

    pub fn tier_list(&self, tier: Tier) -> PathBuf {
        self.lists_dir()
            .join("debloat")
            .join(format!("{}.txt", tier.as_str()))
    }

    /// Single flat list used before tiers existed
    pub fn legacy_list(&self) -> PathBuf {
        self.lists_dir().join("debloat.txt")
    }

    pub fn vendor_overlay(&self, vendor: &str) -> PathBuf {
        self.lists_dir().join("vendor").join(format!("{vendor}.txt"))
    }

    /// Privacy-services removal list
    pub fn supplemental_list(&self) -> PathBuf {
        self.lists_dir().join("degoogle.txt")
    }

    pub fn app_sets_dir(&self) -> PathBuf {
        self.data_dir.join("apps").join("sets")
    }

    pub fn local_apk_dir(&self) -> PathBuf {
        self.data_dir.join("apps").join("local")
    }

    pub fn settings_dir(&self) -> PathBuf {
        self.data_dir.join("settings")
    }

    pub fn settings_profile(&self, name: &str) -> PathBuf {
        self.settings_dir().join(format!("{name}.txt"))
    }

    pub fn download_dir(&self) -> PathBuf {
        self.cache_dir.join("downloads")
    }

    pub fn catalog_index(&self) -> PathBuf {
        self.cache_dir.join("catalog-index.json")
    }
}
