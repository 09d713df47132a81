//! Device fact detection

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use super::{BridgeError, DeviceSession};
use crate::config::DataLayout;
use crate::debloat::{Tier, canonical_vendor};

pub const PROP_MANUFACTURER: &str = "ro.product.manufacturer";
pub const PROP_MODEL: &str = "ro.product.model";
pub const PROP_RELEASE: &str = "ro.build.version.release";
pub const PROP_SDK: &str = "ro.build.version.sdk";

/// Vendor-specific properties, checked in order.
const SKIN_PROPERTIES: &[(&str, VendorSkin)] = &[
    ("ro.build.version.oneui", VendorSkin::OneUi),
    ("ro.miui.ui.version.name", VendorSkin::Miui),
    ("ro.build.version.emui", VendorSkin::Emui),
    ("ro.oxygen.version", VendorSkin::OxygenOs),
    ("ro.build.version.opporom", VendorSkin::ColorOs),
];

/// Vendor UI layered over Android.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorSkin {
    OneUi,
    Miui,
    Emui,
    OxygenOs,
    ColorOs,
    Pixel,
    Stock,
}

impl VendorSkin {
    fn from_vendor(vendor: &str) -> Self {
        match vendor {
            "samsung" => Self::OneUi,
            "xiaomi" => Self::Miui,
            "huawei" | "honor" => Self::Emui,
            "oneplus" => Self::OxygenOs,
            "oppo" | "realme" => Self::ColorOs,
            "google" => Self::Pixel,
            _ => Self::Stock,
        }
    }

    /// Near-stock builds where a light pass is enough.
    pub fn is_near_stock(&self) -> bool {
        matches!(self, Self::Pixel | Self::Stock)
    }
}

impl fmt::Display for VendorSkin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OneUi => "One UI",
            Self::Miui => "MIUI",
            Self::Emui => "EMUI",
            Self::OxygenOs => "OxygenOS",
            Self::ColorOs => "ColorOS",
            Self::Pixel => "Pixel",
            Self::Stock => "stock",
        };
        f.write_str(name)
    }
}

/// Facts about the connected device plus the suggestions derived from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceProfile {
    pub serial: String,
    pub manufacturer: String,
    pub model: String,
    pub android_version: String,
    pub sdk: Option<u32>,
    pub rooted: bool,
    pub skin: VendorSkin,
    /// Canonical vendor key used to pick an overlay list
    pub vendor: String,
    pub suggested_tier: Tier,
    /// Settings profile name, only when `settings/<name>.txt` exists
    pub suggested_settings: Option<String>,
}

impl DeviceProfile {
    /// Query the device and derive a profile.
    ///
    /// The four base properties must be readable. Skin properties and the
    /// root probe are optional and count as absent on failure.
    pub fn detect(session: &DeviceSession, layout: &DataLayout) -> Result<Self, BridgeError> {
        let mut props = HashMap::new();
        for key in [PROP_MANUFACTURER, PROP_MODEL, PROP_RELEASE, PROP_SDK] {
            props.insert(key.to_string(), session.get_property(key)?);
        }
        for &(key, _) in SKIN_PROPERTIES {
            match session.get_property(key) {
                Ok(value) => {
                    props.insert(key.to_string(), value);
                }
                Err(e) => tracing::debug!(property = key, error = %e, "property not readable"),
            }
        }

        let rooted = match session.shell(&["su", "-c", "id"]) {
            Ok(output) => output.stdout.contains("uid=0"),
            Err(e) => {
                tracing::debug!(error = %e, "root probe failed");
                false
            }
        };

        let profile = Self::from_properties(session.serial(), &props, rooted, layout);
        tracing::info!(
            manufacturer = %profile.manufacturer,
            model = %profile.model,
            skin = %profile.skin,
            "device detected"
        );
        Ok(profile)
    }

    /// Derive a profile from already-read properties.
    pub fn from_properties(
        serial: &str,
        props: &HashMap<String, String>,
        rooted: bool,
        layout: &DataLayout,
    ) -> Self {
        let get = |key: &str| {
            props
                .get(key)
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        };

        let manufacturer = get(PROP_MANUFACTURER);
        let model = get(PROP_MODEL);
        let vendor = canonical_vendor(&manufacturer);

        let skin = SKIN_PROPERTIES
            .iter()
            .find(|entry| !get(entry.0).is_empty())
            .map(|entry| entry.1)
            .unwrap_or_else(|| VendorSkin::from_vendor(&vendor));

        let suggested_tier = if skin.is_near_stock() {
            Tier::Light
        } else {
            Tier::Standard
        };

        let slug = model_slug(&model);
        let suggested_settings =
            (!slug.is_empty() && layout.settings_profile(&slug).is_file()).then_some(slug);

        Self {
            serial: serial.to_string(),
            sdk: get(PROP_SDK).parse().ok(),
            android_version: get(PROP_RELEASE),
            manufacturer,
            model,
            rooted,
            skin,
            vendor,
            suggested_tier,
            suggested_settings,
        }
    }
}

/// Lower-case a model name and collapse non-alphanumerics to single dashes.
pub fn model_slug(model: &str) -> String {
    let mut slug = String::with_capacity(model.len());
    for c in model.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
