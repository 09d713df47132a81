//! Turns manifest entries into installable files.

use std::cell::OnceCell;
use std::path::{Path, PathBuf};

use super::artifact::validate_artifact;
use super::catalog::{CatalogIndex, IndexCache};
use super::{Downloader, FetchError, ManifestEntry, SourceKind};

/// Resolves entries to local artifacts, downloading into a cache as needed.
#[derive(Debug)]
pub struct SourceFetcher<D> {
    local_dir: PathBuf,
    download_dir: PathBuf,
    index_cache: IndexCache,
    repo_url: String,
    downloader: D,
    force: bool,
    // Loaded at most once per fetcher; `None` inside means no usable index.
    index: OnceCell<Option<CatalogIndex>>,
}

impl<D: Downloader> SourceFetcher<D> {
    pub fn new(
        local_dir: PathBuf,
        download_dir: PathBuf,
        index_cache: IndexCache,
        repo_url: String,
        downloader: D,
    ) -> Self {
        Self {
            local_dir,
            download_dir,
            index_cache,
            repo_url: repo_url.trim_end_matches('/').to_string(),
            downloader,
            force: false,
            index: OnceCell::new(),
        }
    }

    /// Re-download cached artifacts and refresh the index regardless of age.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    pub fn downloader(&self) -> &D {
        &self.downloader
    }

    /// Obtain a local artifact for `entry`.
    pub fn fetch(&self, entry: &ManifestEntry) -> Result<PathBuf, FetchError> {
        match entry.kind {
            SourceKind::Local => self.fetch_local(&entry.value),
            SourceKind::Catalog => self.fetch_catalog(&entry.value),
            SourceKind::Url => self.fetch_url(&entry.value),
        }
    }

    fn fetch_local(&self, value: &str) -> Result<PathBuf, FetchError> {
        let file_name = plain_name(value)?;
        let path = self.local_dir.join(file_name);
        if !path.is_file() {
            return Err(FetchError::NotFound { path });
        }
        Ok(path)
    }

    fn fetch_catalog(&self, package: &str) -> Result<PathBuf, FetchError> {
        let guessed_name = plain_name(&format!("{package}.apk"))?;
        let index = self
            .index
            .get_or_init(|| self.index_cache.load_or_refresh(&self.downloader, self.force));

        let (url, file_name) = match index.as_ref().and_then(|i| i.latest_filename(package)) {
            Some(release) => {
                let file_name = safe_file_name(release).ok_or_else(|| FetchError::InvalidUrl {
                    url: release.to_string(),
                    reason: "catalog release name is not a plain file name".to_string(),
                })?;
                (format!("{}/{}", self.repo_url, file_name), file_name)
            }
            None => {
                let url = guessed_catalog_url(&self.repo_url, package);
                tracing::warn!(
                    package,
                    url = %url,
                    "package not in catalog index, guessing download URL"
                );
                (url, guessed_name)
            }
        };

        self.download_to_cache(&url, &file_name)
    }

    fn fetch_url(&self, url: &str) -> Result<PathBuf, FetchError> {
        let file_name = file_name_from_url(url)?;
        self.download_to_cache(url, &file_name)
    }

    /// Download `url` as `file_name` unless already cached, then validate.
    fn download_to_cache(&self, url: &str, file_name: &str) -> Result<PathBuf, FetchError> {
        let dest = self.download_dir.join(file_name);

        if dest.is_file() && !self.force {
            tracing::debug!(path = %dest.display(), "using cached artifact");
            return Ok(dest);
        }

        std::fs::create_dir_all(&self.download_dir)?;

        if let Err(e) = self.downloader.download(url, &dest) {
            remove_partial(&dest);
            return Err(e);
        }

        if let Err(reason) = validate_artifact(&dest) {
            remove_partial(&dest);
            return Err(FetchError::InvalidArtifact { path: dest, reason });
        }

        tracing::info!(url, path = %dest.display(), "downloaded artifact");
        Ok(dest)
    }
}

/// Best-effort guess at a release URL for packages missing from the index.
///
/// Catalog release names normally embed a version code, so this URL often
/// does not exist; the download then fails like any other.
pub fn guessed_catalog_url(repo_url: &str, package: &str) -> String {
    format!("{}/{}.apk", repo_url.trim_end_matches('/'), package)
}

/// Derive a cache file name from a URL's last path segment.
///
/// The query string and fragment are ignored; `.apk` is appended when the
/// segment has no such extension.
pub fn file_name_from_url(raw: &str) -> Result<String, FetchError> {
    let invalid = |reason: &str| FetchError::InvalidUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };

    let parsed = url::Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;
    let segment = parsed
        .path_segments()
        .and_then(|segments| segments.rev().find(|s| !s.is_empty()))
        .ok_or_else(|| invalid("URL has no path segment"))?;

    let name = safe_file_name(segment).ok_or_else(|| invalid("unusable path segment"))?;

    if name.to_lowercase().ends_with(".apk") {
        Ok(name)
    } else {
        Ok(format!("{name}.apk"))
    }
}

/// Accept only a single, plain path component.
fn safe_file_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains('/')
        || trimmed.contains('\\')
    {
        return None;
    }
    Some(trimmed.to_string())
}

fn plain_name(value: &str) -> Result<String, FetchError> {
    safe_file_name(value).ok_or_else(|| FetchError::UnsafeName {
        value: value.to_string(),
    })
}

fn remove_partial(path: &Path) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove partial download");
        }
    }
}
