//! HTTP downloads.

use std::path::{Path, PathBuf};

use super::FetchError;

/// Transfers a remote resource to a local file.
///
/// Implementations must leave no file at `dest` when they fail.
pub trait Downloader {
    fn download(&self, url: &str, dest: &Path) -> Result<(), FetchError>;
}

/// reqwest-backed downloader driven on its own tokio runtime.
///
/// Calls block the current thread until the transfer finishes.
#[derive(Debug)]
pub struct HttpDownloader {
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
}

impl HttpDownloader {
    pub fn new() -> Result<Self, FetchError> {
        let runtime = tokio::runtime::Runtime::new()?;
        let client = reqwest::Client::builder()
            .user_agent(concat!("deckhand/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::HttpClient(e.to_string()))?;
        Ok(Self { client, runtime })
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let download_error = |reason: String| FetchError::Download {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| download_error(e.to_string()))?;

        if !response.status().is_success() {
            return Err(download_error(format!("HTTP {}", response.status())));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| download_error(format!("failed to read response body: {e}")))?;

        Ok(bytes.to_vec())
    }
}

impl Downloader for HttpDownloader {
    fn download(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        tracing::debug!(url, dest = %dest.display(), "downloading");

        let bytes = self.runtime.block_on(self.fetch_bytes(url))?;

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Write beside the target and rename so a failed write never leaves
        // a truncated file under the final name.
        let partial = partial_path(dest);
        if let Err(e) = std::fs::write(&partial, &bytes) {
            let _ = std::fs::remove_file(&partial);
            return Err(e.into());
        }
        std::fs::rename(&partial, dest).inspect_err(|_| {
            let _ = std::fs::remove_file(&partial);
        })?;

        tracing::debug!(url, bytes = bytes.len(), "download complete");
        Ok(())
    }
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_path_appends_suffix() {
        assert_eq!(
            partial_path(Path::new("/cache/downloads/app.apk")),
            PathBuf::from("/cache/downloads/app.apk.part")
        );
    }
}
