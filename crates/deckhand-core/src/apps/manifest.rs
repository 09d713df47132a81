//! App-set manifest resolution.

use std::path::{Path, PathBuf};

use crate::list::{Directive, IncludeContext, dedup_preserving_order, walk};

use super::ManifestEntry;

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("app set '{name}' not found at {}", path.display())]
    NotFound { name: String, path: PathBuf },

    #[error("failed to list app sets in {}: {source}", dir.display())]
    ListSets {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Resolves named app sets into ordered, unique entries.
#[derive(Debug, Clone)]
pub struct ManifestResolver {
    sets_dir: PathBuf,
}

impl ManifestResolver {
    pub fn new(sets_dir: PathBuf) -> Self {
        Self { sets_dir }
    }

    pub fn sets_dir(&self) -> &Path {
        &self.sets_dir
    }

    /// Path for an app-set name.
    ///
    /// Names with a path separator are used as-is. Bare names live in the
    /// sets directory, with or without the `.txt` extension.
    pub fn manifest_path(&self, name: &str) -> PathBuf {
        if name.contains(std::path::MAIN_SEPARATOR) || name.contains('/') {
            PathBuf::from(name)
        } else if name.ends_with(".txt") {
            self.sets_dir.join(name)
        } else {
            self.sets_dir.join(format!("{name}.txt"))
        }
    }

    /// Resolve a named app set.
    pub fn resolve(&self, name: &str) -> Result<Vec<ManifestEntry>, ManifestError> {
        let path = self.manifest_path(name);
        if !path.is_file() {
            return Err(ManifestError::NotFound {
                name: name.to_string(),
                path,
            });
        }
        Ok(resolve_file(&path))
    }

    /// Names of available app sets, sorted.
    pub fn available_sets(&self) -> Result<Vec<String>, ManifestError> {
        if !self.sets_dir.is_dir() {
            return Ok(Vec::new());
        }

        let read_dir = std::fs::read_dir(&self.sets_dir).map_err(|source| ManifestError::ListSets {
            dir: self.sets_dir.clone(),
            source,
        })?;

        let mut names: Vec<String> = read_dir
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "txt"))
            .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().to_string()))
            .collect();
        names.sort();
        Ok(names)
    }
}

/// Resolve a manifest file, following includes.
///
/// Only typed entries are kept. Lines that are neither includes nor typed
/// entries are ignored, so free-form notes without a leading `#` are
/// tolerated.
pub fn resolve_file(path: &Path) -> Vec<ManifestEntry> {
    let mut visited = IncludeContext::new();
    let mut entries = Vec::new();

    walk(path, &mut visited, &mut |directive, line| match directive {
        Directive::Entry(kind, value) => entries.push(ManifestEntry::new(kind, value)),
        Directive::Literal(_) => {
            tracing::debug!(path = %path.display(), line, "ignoring unrecognized manifest line");
        }
        Directive::Include(_) => {}
    });

    dedup_preserving_order(entries)
}
