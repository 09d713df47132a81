//! Debloat command implementation.
//!
//! Composes the removal list for a tier and applies it.

use crate::context::{AppContext, RunOptions};
use crate::debloat::{DebloatComposer, Tier};
use crate::device::DeviceSession;
use crate::exec::{Executor, RunSummary};
use crate::list::ResolvedActionSet;

/// Options for the debloat command
#[derive(Debug, Clone)]
pub struct DebloatOptions {
    /// Tier name (light, standard, aggressive)
    pub tier: String,
    /// Manufacturer used to pick a vendor overlay
    pub vendor: Option<String>,
    /// Also remove the privacy-services list
    pub degoogle: bool,
}

impl DebloatOptions {
    pub fn new(tier: impl Into<String>) -> Self {
        Self {
            tier: tier.into(),
            vendor: None,
            degoogle: false,
        }
    }

    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = Some(vendor.into());
        self
    }

    pub fn with_degoogle(mut self, degoogle: bool) -> Self {
        self.degoogle = degoogle;
        self
    }
}

/// Packages selected for removal.
#[derive(Debug, Clone)]
pub struct DebloatPlan {
    pub tier: Tier,
    pub vendor: Option<String>,
    pub degoogle: bool,
    pub packages: ResolvedActionSet,
}

pub struct DebloatCommand<'a> {
    ctx: &'a AppContext,
}

impl<'a> DebloatCommand<'a> {
    pub fn new(ctx: &'a AppContext) -> Self {
        Self { ctx }
    }

    /// Resolve the removal list. Fails only on an unknown tier name.
    pub fn plan(&self, options: &DebloatOptions) -> anyhow::Result<DebloatPlan> {
        let tier: Tier = options.tier.parse()?;
        let composer = DebloatComposer::new(self.ctx.layout());
        let packages = composer.compose(tier, options.vendor.as_deref(), options.degoogle);
        tracing::debug!(tier = %tier, packages = packages.len(), "debloat plan ready");

        Ok(DebloatPlan {
            tier,
            vendor: options.vendor.clone(),
            degoogle: options.degoogle,
            packages,
        })
    }

    pub fn execute(
        &self,
        session: &DeviceSession,
        plan: &DebloatPlan,
        run: RunOptions,
    ) -> anyhow::Result<RunSummary> {
        let summary = Executor::new(session, run).remove_packages(&plan.packages)?;
        Ok(summary)
    }
}
