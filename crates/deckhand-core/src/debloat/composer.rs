//! Tier/vendor composition.

use crate::config::DataLayout;
use crate::list::{ResolvedActionSet, load_list};

use super::{InvalidTierError, Tier, canonical_vendor};

/// Builds the package-removal set for one run.
#[derive(Debug, Clone)]
pub struct DebloatComposer<'a> {
    layout: &'a DataLayout,
}

impl<'a> DebloatComposer<'a> {
    pub fn new(layout: &'a DataLayout) -> Self {
        Self { layout }
    }

    /// Compose from a tier name, validating it first.
    pub fn compose_named(
        &self,
        tier: &str,
        vendor: Option<&str>,
        supplemental: bool,
    ) -> Result<ResolvedActionSet, InvalidTierError> {
        let tier: Tier = tier.parse()?;
        Ok(self.compose(tier, vendor, supplemental))
    }

    /// Compose base tier, then vendor overlay, then supplemental list.
    ///
    /// Each list is loaded with its own include context. The concatenation
    /// is deduplicated keeping first occurrence.
    pub fn compose(
        &self,
        tier: Tier,
        vendor: Option<&str>,
        supplemental: bool,
    ) -> ResolvedActionSet {
        let mut sequences = vec![self.load_tier(tier)];

        if let Some(vendor) = vendor {
            let key = canonical_vendor(vendor);
            let overlay = self.layout.vendor_overlay(&key);
            if overlay.is_file() {
                tracing::debug!(vendor = %key, path = %overlay.display(), "loading vendor overlay");
                sequences.push(load_list(&overlay));
            } else {
                tracing::debug!(vendor = %key, "no vendor overlay");
            }
        }

        if supplemental {
            let path = self.layout.supplemental_list();
            if path.is_file() {
                sequences.push(load_list(&path));
            } else {
                tracing::warn!(path = %path.display(), "supplemental list not found");
            }
        }

        ResolvedActionSet::from_sequences(sequences)
    }

    fn load_tier(&self, tier: Tier) -> Vec<String> {
        let tier_path = self.layout.tier_list(tier);
        if tier_path.is_file() {
            return load_list(&tier_path);
        }

        let legacy = self.layout.legacy_list();
        if legacy.is_file() {
            tracing::warn!(
                tier = %tier,
                legacy = %legacy.display(),
                "tier list not found, using legacy flat list"
            );
            return load_list(&legacy);
        }

        tracing::warn!(tier = %tier, path = %tier_path.display(), "no debloat list available");
        Vec::new()
    }
}
