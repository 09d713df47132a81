//! Config file lookup and loading.

use std::path::{Path, PathBuf};

use super::{ConfigError, DeckhandConfig, parser};

pub const CONFIG_FILE_NAME: &str = "deckhand.toml";

/// Locates and loads deckhand.toml.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    explicit: Option<PathBuf>,
    candidates: Vec<PathBuf>,
}

impl ConfigStore {
    /// Standard lookup: `explicit`, then `<cwd>/deckhand.toml`, then the
    /// user config directory.
    pub fn from_defaults(explicit: Option<PathBuf>, cwd: &Path) -> Self {
        let mut candidates = vec![cwd.join(CONFIG_FILE_NAME)];
        if let Some(dir) = dirs::config_dir() {
            candidates.push(dir.join("deckhand").join(CONFIG_FILE_NAME));
        }
        Self {
            explicit,
            candidates,
        }
    }

    /// Lookup over an explicit candidate list (for testing).
    pub fn from_candidates(explicit: Option<PathBuf>, candidates: Vec<PathBuf>) -> Self {
        Self {
            explicit,
            candidates,
        }
    }

    /// The file that would be loaded, if any.
    pub fn locate(&self) -> Option<PathBuf> {
        if let Some(explicit) = &self.explicit {
            return Some(explicit.clone());
        }
        self.candidates.iter().find(|p| p.is_file()).cloned()
    }

    /// Load the config and report which file it came from.
    ///
    /// An explicit path must exist. Without one, a missing file means defaults.
    pub fn load(&self) -> Result<(DeckhandConfig, Option<PathBuf>), ConfigError> {
        match self.locate() {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading config");
                let config = parser::parse_config_file(&path)?;
                Ok((config, Some(path)))
            }
            None => {
                tracing::debug!("no config file found, using defaults");
                Ok((DeckhandConfig::new(), None))
            }
        }
    }
}
