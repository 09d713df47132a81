//! Integration tests for artifact fetching, caching and validation.

mod support;

use std::time::{Duration, SystemTime};

use deckhand_core::apps::{FetchError, ManifestEntry, SourceFetcher};
use deckhand_core::config::{DEFAULT_INDEX_URL, DataLayout};
use deckhand_core::context::AppContext;
use filetime::FileTime;
use support::{FakeDownloader, Response, layout, write_apk, write_file};
use tempfile::TempDir;

const INDEX: &str = r#"{
    "repo": { "name": "test" },
    "packages": {
        "org.example.notes": [
            { "apkName": "org.example.notes_42.apk", "versionCode": 42 },
            { "apkName": "org.example.notes_41.apk", "versionCode": 41 }
        ]
    }
}"#;

fn fetcher(layout: &DataLayout, downloader: FakeDownloader, force: bool) -> SourceFetcher<FakeDownloader> {
    AppContext::with_layout(layout.clone()).source_fetcher_with(downloader, force)
}

fn age(path: &std::path::Path, by: Duration) {
    let then = FileTime::from_system_time(SystemTime::now() - by);
    filetime::set_file_mtime(path, then).unwrap();
}

#[test]
fn catalog_entry_uses_latest_release_from_index() {
    let temp = TempDir::new().unwrap();
    let layout = layout(temp.path());
    let downloader = FakeDownloader::new(Response::Apk)
        .route(DEFAULT_INDEX_URL, Response::Text(INDEX.to_string()));
    let fetcher = fetcher(&layout, downloader, false);

    let path = fetcher
        .fetch(&ManifestEntry::catalog("org.example.notes"))
        .unwrap();

    assert_eq!(path, layout.download_dir().join("org.example.notes_42.apk"));
    assert!(path.is_file());
    assert_eq!(
        fetcher.downloader().requests(),
        vec![
            DEFAULT_INDEX_URL.to_string(),
            "https://f-droid.org/repo/org.example.notes_42.apk".to_string(),
        ]
    );
}

#[test]
fn package_missing_from_index_falls_back_to_guessed_url() {
    let temp = TempDir::new().unwrap();
    let layout = layout(temp.path());
    let downloader = FakeDownloader::new(Response::Fail)
        .route(DEFAULT_INDEX_URL, Response::Text(INDEX.to_string()));
    let fetcher = fetcher(&layout, downloader, false);

    let err = fetcher
        .fetch(&ManifestEntry::catalog("org.unknown.app"))
        .unwrap_err();

    assert!(matches!(err, FetchError::Download { ref url, .. }
        if url == "https://f-droid.org/repo/org.unknown.app.apk"));
    assert!(!layout.download_dir().join("org.unknown.app.apk").exists());
    assert_eq!(
        fetcher.downloader().requests().last().map(String::as_str),
        Some("https://f-droid.org/repo/org.unknown.app.apk")
    );
}

#[test]
fn guessed_url_can_succeed() {
    let temp = TempDir::new().unwrap();
    let layout = layout(temp.path());
    // No index at all: the index download fails, everything else is an APK.
    let downloader = FakeDownloader::new(Response::Apk).route(DEFAULT_INDEX_URL, Response::Fail);
    let fetcher = fetcher(&layout, downloader, false);

    let path = fetcher
        .fetch(&ManifestEntry::catalog("org.guess.me"))
        .unwrap();

    assert_eq!(path, layout.download_dir().join("org.guess.me.apk"));
}

#[test]
fn fresh_index_is_not_refreshed() {
    let temp = TempDir::new().unwrap();
    let layout = layout(temp.path());
    write_file(&layout.catalog_index(), INDEX);
    let fetcher = fetcher(&layout, FakeDownloader::new(Response::Apk), false);

    fetcher
        .fetch(&ManifestEntry::catalog("org.example.notes"))
        .unwrap();

    assert_eq!(
        fetcher.downloader().requests(),
        vec!["https://f-droid.org/repo/org.example.notes_42.apk".to_string()]
    );
}

#[test]
fn stale_index_is_refreshed() {
    let temp = TempDir::new().unwrap();
    let layout = layout(temp.path());
    write_file(&layout.catalog_index(), r#"{"packages": {}}"#);
    age(&layout.catalog_index(), Duration::from_secs(2 * 3600));

    let downloader = FakeDownloader::new(Response::Apk)
        .route(DEFAULT_INDEX_URL, Response::Text(INDEX.to_string()));
    let fetcher = fetcher(&layout, downloader, false);

    let path = fetcher
        .fetch(&ManifestEntry::catalog("org.example.notes"))
        .unwrap();

    assert!(path.ends_with("org.example.notes_42.apk"));
    assert_eq!(fetcher.downloader().requests()[0], DEFAULT_INDEX_URL);
}

#[test]
fn failed_refresh_falls_back_to_stale_index() {
    let temp = TempDir::new().unwrap();
    let layout = layout(temp.path());
    write_file(&layout.catalog_index(), INDEX);
    age(&layout.catalog_index(), Duration::from_secs(2 * 3600));

    let downloader = FakeDownloader::new(Response::Apk).route(DEFAULT_INDEX_URL, Response::Fail);
    let fetcher = fetcher(&layout, downloader, false);

    let path = fetcher
        .fetch(&ManifestEntry::catalog("org.example.notes"))
        .unwrap();

    assert!(path.ends_with("org.example.notes_42.apk"));
}

#[test]
fn unparseable_refresh_keeps_stale_index() {
    let temp = TempDir::new().unwrap();
    let layout = layout(temp.path());
    write_file(&layout.catalog_index(), INDEX);
    age(&layout.catalog_index(), Duration::from_secs(2 * 3600));

    let downloader = FakeDownloader::new(Response::Apk).route(
        DEFAULT_INDEX_URL,
        Response::Text("<html>captive portal</html>".to_string()),
    );
    let fetcher = fetcher(&layout, downloader, false);

    let path = fetcher
        .fetch(&ManifestEntry::catalog("org.example.notes"))
        .unwrap();

    assert!(path.ends_with("org.example.notes_42.apk"));
    assert_eq!(
        fetcher.downloader().requests().last().map(String::as_str),
        Some("https://f-droid.org/repo/org.example.notes_42.apk")
    );
    assert_eq!(std::fs::read_to_string(layout.catalog_index()).unwrap(), INDEX);
    let leftovers: Vec<_> = std::fs::read_dir(layout.catalog_index().parent().unwrap())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().ends_with(".partial"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn index_is_consulted_once_per_fetcher() {
    let temp = TempDir::new().unwrap();
    let layout = layout(temp.path());
    let downloader = FakeDownloader::new(Response::Apk)
        .route(DEFAULT_INDEX_URL, Response::Text(INDEX.to_string()));
    let fetcher = fetcher(&layout, downloader, false);

    fetcher.fetch(&ManifestEntry::catalog("org.a")).unwrap();
    fetcher.fetch(&ManifestEntry::catalog("org.b")).unwrap();

    let index_requests = fetcher
        .downloader()
        .requests()
        .iter()
        .filter(|url| url.as_str() == DEFAULT_INDEX_URL)
        .count();
    assert_eq!(index_requests, 1);
}

#[test]
fn cached_artifact_is_reused_unless_forced() {
    let temp = TempDir::new().unwrap();
    let layout = layout(temp.path());
    let entry = ManifestEntry::url("https://example.com/files/tool?token=abc");

    let first = fetcher(&layout, FakeDownloader::new(Response::Apk), false);
    let path = first.fetch(&entry).unwrap();
    assert_eq!(path, layout.download_dir().join("tool.apk"));
    first.fetch(&entry).unwrap();
    assert_eq!(first.downloader().requests().len(), 1);

    let forced = fetcher(&layout, FakeDownloader::new(Response::Apk), true);
    forced.fetch(&entry).unwrap();
    assert_eq!(forced.downloader().requests().len(), 1);
}

#[test]
fn forced_fetch_refreshes_fresh_index() {
    let temp = TempDir::new().unwrap();
    let layout = layout(temp.path());
    write_file(&layout.catalog_index(), INDEX);

    let downloader = FakeDownloader::new(Response::Apk)
        .route(DEFAULT_INDEX_URL, Response::Text(INDEX.to_string()));
    let fetcher = fetcher(&layout, downloader, true);
    fetcher
        .fetch(&ManifestEntry::catalog("org.example.notes"))
        .unwrap();

    assert_eq!(fetcher.downloader().requests()[0], DEFAULT_INDEX_URL);
}

#[test]
fn invalid_download_is_deleted() {
    let temp = TempDir::new().unwrap();
    let layout = layout(temp.path());
    let fetcher = fetcher(&layout, FakeDownloader::new(Response::Garbage), false);

    let err = fetcher
        .fetch(&ManifestEntry::url("https://example.com/broken.apk"))
        .unwrap_err();

    assert!(matches!(err, FetchError::InvalidArtifact { .. }));
    assert!(!layout.download_dir().join("broken.apk").exists());
}

#[test]
fn local_entries_resolve_against_local_dir() {
    let temp = TempDir::new().unwrap();
    let layout = layout(temp.path());
    write_apk(&layout.local_apk_dir().join("vpn.apk"));
    let fetcher = fetcher(&layout, FakeDownloader::new(Response::Fail), false);

    let path = fetcher.fetch(&ManifestEntry::local("vpn.apk")).unwrap();
    assert_eq!(path, layout.local_apk_dir().join("vpn.apk"));

    let err = fetcher
        .fetch(&ManifestEntry::local("missing.apk"))
        .unwrap_err();
    assert!(matches!(err, FetchError::NotFound { .. }));
    assert!(fetcher.downloader().requests().is_empty());
}

#[test]
fn local_entries_cannot_leave_local_dir() {
    let temp = TempDir::new().unwrap();
    let layout = layout(temp.path());
    write_apk(&temp.path().join("outside.apk"));
    let fetcher = fetcher(&layout, FakeDownloader::new(Response::Fail), false);

    for value in ["../../outside.apk", "/etc/passwd", ".."] {
        let err = fetcher.fetch(&ManifestEntry::local(value)).unwrap_err();
        assert!(
            matches!(err, FetchError::UnsafeName { .. }),
            "{value} should be rejected, got {err:?}"
        );
    }
}

#[test]
fn catalog_package_with_path_segments_is_rejected() {
    let temp = TempDir::new().unwrap();
    let layout = layout(temp.path());
    let downloader = FakeDownloader::new(Response::Apk).route(DEFAULT_INDEX_URL, Response::Fail);
    let fetcher = fetcher(&layout, downloader, false);

    let err = fetcher
        .fetch(&ManifestEntry::catalog("../../escaped"))
        .unwrap_err();

    assert!(matches!(err, FetchError::UnsafeName { .. }));
    assert!(fetcher.downloader().requests().is_empty());
    assert!(!temp.path().join("escaped.apk").exists());
}
