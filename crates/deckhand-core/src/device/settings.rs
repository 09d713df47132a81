//! Device settings profiles
//!
//! A profile is a list file whose lines read `<namespace> <key> <value...>`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

use crate::config::DataLayout;
use crate::list::load_list;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings profile '{name}' not found at {}", path.display())]
    NotFound { name: String, path: PathBuf },

    #[error("malformed settings line '{line}': {reason}")]
    Malformed { line: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingNamespace {
    System,
    Secure,
    Global,
}

impl SettingNamespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Secure => "secure",
            Self::Global => "global",
        }
    }
}

impl fmt::Display for SettingNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingNamespace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Self::System),
            "secure" => Ok(Self::Secure),
            "global" => Ok(Self::Global),
            other => Err(format!(
                "unknown namespace '{other}' (expected system, secure or global)"
            )),
        }
    }
}

/// One `settings put` invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingPoke {
    pub namespace: SettingNamespace,
    pub key: String,
    pub value: String,
}

impl SettingPoke {
    pub fn new(
        namespace: SettingNamespace,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            namespace,
            key: key.into(),
            value: value.into(),
        }
    }

    /// Parse a trimmed profile line. The value is everything after the key,
    /// with inner whitespace kept.
    pub fn parse(line: &str) -> Result<Self, SettingsError> {
        let malformed = |reason: String| SettingsError::Malformed {
            line: line.to_string(),
            reason,
        };

        let line = line.trim();
        let (namespace, rest) = line
            .split_once(char::is_whitespace)
            .ok_or_else(|| malformed("expected '<namespace> <key> <value>'".to_string()))?;
        let rest = rest.trim_start();
        let (key, value) = rest
            .split_once(char::is_whitespace)
            .ok_or_else(|| malformed("missing value".to_string()))?;

        let namespace: SettingNamespace = namespace.parse().map_err(malformed)?;
        Ok(Self::new(namespace, key, value.trim()))
    }
}

impl fmt::Display for SettingPoke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} = {}", self.namespace, self.key, self.value)
    }
}

/// Load the named profile from `settings/<name>.txt`.
pub fn load_profile(layout: &DataLayout, name: &str) -> Result<Vec<SettingPoke>, SettingsError> {
    let path = layout.settings_profile(name);
    if !path.is_file() {
        return Err(SettingsError::NotFound {
            name: name.to_string(),
            path,
        });
    }
    Ok(load_profile_file(&path))
}

/// Parse a profile file, skipping malformed lines with a warning.
pub fn load_profile_file(path: &Path) -> Vec<SettingPoke> {
    load_list(path)
        .iter()
        .filter_map(|line| match SettingPoke::parse(line) {
            Ok(poke) => Some(poke),
            Err(e) => {
                tracing::warn!(path = %path.display(), "{e}");
                None
            }
        })
        .collect()
}
