//! Package archive validation.
//!
//! APK, APKS and XAPK files are all zip containers, so a valid artifact must
//! start with a zip signature and open as a zip archive.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

const ZIP_LOCAL_HEADER: [u8; 4] = *b"PK\x03\x04";
const ZIP_EMPTY_ARCHIVE: [u8; 4] = *b"PK\x05\x06";
const ZIP_SPANNED: [u8; 4] = *b"PK\x07\x08";

/// Check the leading magic bytes.
pub fn has_zip_signature(path: &Path) -> std::io::Result<bool> {
    let mut file = File::open(path)?;
    let mut magic = [0u8; 4];
    let mut read = 0;
    while read < magic.len() {
        match file.read(&mut magic[read..])? {
            0 => return Ok(false),
            n => read += n,
        }
    }
    Ok(matches!(
        magic,
        ZIP_LOCAL_HEADER | ZIP_EMPTY_ARCHIVE | ZIP_SPANNED
    ))
}

/// Confirm `path` is a recognized package archive.
///
/// Returns a human-readable reason on failure.
pub fn validate_artifact(path: &Path) -> Result<(), String> {
    match has_zip_signature(path) {
        Ok(true) => {}
        Ok(false) => return Err("missing zip signature".to_string()),
        Err(e) => return Err(format!("cannot read file: {e}")),
    }

    let file = File::open(path).map_err(|e| format!("cannot read file: {e}"))?;
    let archive = zip::ZipArchive::new(file).map_err(|e| format!("corrupt archive: {e}"))?;
    if archive.len() == 0 {
        return Err("archive has no entries".to_string());
    }
    Ok(())
}

/// Size and digest of an artifact on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactInfo {
    pub path: PathBuf,
    pub size: u64,
    /// blake3 hex digest
    pub digest: String,
}

pub fn describe_artifact(path: &Path) -> std::io::Result<ArtifactInfo> {
    let mut file = File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    let size = std::io::copy(&mut file, &mut hasher)?;
    Ok(ArtifactInfo {
        path: path.to_path_buf(),
        size,
        digest: hasher.finalize().to_hex().to_string(),
    })
}
