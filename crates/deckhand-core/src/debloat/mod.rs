//! Debloat tiers and vendor overlays
//!
//! Tiers are cumulative by authoring convention: `standard.txt` includes
//! `light.txt`, `aggressive.txt` includes `standard.txt`. The loader does
//! not enforce this.

mod composer;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

pub use composer::DebloatComposer;

/// Removal aggressiveness, ordered from least to most.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Light,
    Standard,
    Aggressive,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Light, Tier::Standard, Tier::Aggressive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Light => "light",
            Tier::Standard => "standard",
            Tier::Aggressive => "aggressive",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tier name outside the fixed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid tier '{0}': expected one of light, standard, aggressive")]
pub struct InvalidTierError(pub String);

impl FromStr for Tier {
    type Err = InvalidTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Tier::Light),
            "standard" => Ok(Tier::Standard),
            "aggressive" => Ok(Tier::Aggressive),
            _ => Err(InvalidTierError(s.to_string())),
        }
    }
}

/// Map a manufacturer string to the canonical vendor key used for overlay files.
///
/// Sub-brands collapse onto their parent vendor ("redmi", "poco" -> "xiaomi").
pub fn canonical_vendor(raw: &str) -> String {
    let normalized = raw.trim().to_lowercase();
    match normalized.as_str() {
        "redmi" | "poco" | "mi" => "xiaomi".to_string(),
        "hmd global" | "hmd" => "nokia".to_string(),
        "motorola mobility" | "moto" => "motorola".to_string(),
        "samsung electronics" => "samsung".to_string(),
        _ => normalized,
    }
}
