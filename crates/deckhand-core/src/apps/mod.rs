//! App-set manifests and artifact acquisition
//!
//! A manifest lists apps by acquisition source (`local:`, `fdroid:`, `url:`).
//! The resolver flattens includes into ordered, unique entries; the fetcher
//! turns each entry into an installable file on disk.

pub mod artifact;
pub mod catalog;
pub mod download;
pub mod fetcher;
pub mod manifest;

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

pub use artifact::{ArtifactInfo, describe_artifact, validate_artifact};
pub use catalog::{CatalogIndex, CatalogVersion, IndexCache};
pub use download::{Downloader, HttpDownloader};
pub use fetcher::SourceFetcher;
pub use manifest::{ManifestError, ManifestResolver};

/// Where an app comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SourceKind {
    /// File in the local APK directory
    #[serde(rename = "local")]
    Local,
    /// Package identifier looked up in the remote catalog
    #[serde(rename = "fdroid")]
    Catalog,
    /// Direct download URL
    #[serde(rename = "url")]
    Url,
}

impl SourceKind {
    /// Manifest tag for this kind.
    pub fn tag(&self) -> &'static str {
        match self {
            SourceKind::Local => "local",
            SourceKind::Catalog => "fdroid",
            SourceKind::Url => "url",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "local" => Some(SourceKind::Local),
            "fdroid" => Some(SourceKind::Catalog),
            "url" => Some(SourceKind::Url),
            _ => None,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One resolved manifest line. The (kind, value) pair is the identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ManifestEntry {
    pub kind: SourceKind,
    pub value: String,
}

impl ManifestEntry {
    pub fn new(kind: SourceKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn local(file_name: impl Into<String>) -> Self {
        Self::new(SourceKind::Local, file_name)
    }

    pub fn catalog(package: impl Into<String>) -> Self {
        Self::new(SourceKind::Catalog, package)
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self::new(SourceKind::Url, url)
    }

    /// Package identifier, when the entry names one directly.
    pub fn package_id(&self) -> Option<&str> {
        match self.kind {
            SourceKind::Catalog => Some(&self.value),
            SourceKind::Local | SourceKind::Url => None,
        }
    }
}

impl fmt::Display for ManifestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.value)
    }
}

/// Failure to obtain an artifact for one entry.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("local artifact not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("'{value}' is not a plain file name")]
    UnsafeName { value: String },

    #[error("cannot derive a file name from '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("download failed for {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("{} is not a valid package archive: {reason}", path.display())]
    InvalidArtifact { path: PathBuf, reason: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
