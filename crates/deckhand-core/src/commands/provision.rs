//! Provision command implementation.
//!
//! Runs debloat, apps and config in sequence for one device.

use anyhow::Context;

use super::apps::AppsCommand;
use super::debloat::{DebloatCommand, DebloatOptions};
use super::settings::SettingsCommand;
use crate::apps::{Downloader, SourceFetcher};
use crate::context::{AppContext, RunOptions};
use crate::debloat::Tier;
use crate::device::{DeviceProfile, DeviceSession};
use crate::exec::{InstallOutcome, RunSummary};

/// App set picked when provisioning without prompts.
pub const DEFAULT_APP_SET: &str = "default";

/// Choices for one provisioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionPlan {
    pub tier: Tier,
    pub degoogle: bool,
    pub app_set: Option<String>,
    pub settings: Option<String>,
}

/// Per-step summaries. Skipped steps are `None`.
#[derive(Debug, Clone)]
pub struct ProvisionReport {
    pub debloat: RunSummary,
    pub apps: Option<InstallOutcome>,
    pub settings: Option<RunSummary>,
}

pub struct ProvisionCommand<'a> {
    ctx: &'a AppContext,
}

impl<'a> ProvisionCommand<'a> {
    pub fn new(ctx: &'a AppContext) -> Self {
        Self { ctx }
    }

    /// Suggested choices for `profile`: its tier, no degoogle, the `default`
    /// app set when present and its settings profile when present.
    pub fn defaults(&self, profile: &DeviceProfile) -> anyhow::Result<ProvisionPlan> {
        let sets = AppsCommand::new(self.ctx).list_sets()?;
        let app_set = sets
            .iter()
            .any(|s| s == DEFAULT_APP_SET)
            .then(|| DEFAULT_APP_SET.to_string());

        Ok(ProvisionPlan {
            tier: profile.suggested_tier,
            degoogle: false,
            app_set,
            settings: profile.suggested_settings.clone(),
        })
    }

    pub fn execute(
        &self,
        session: &DeviceSession,
        profile: &DeviceProfile,
        plan: &ProvisionPlan,
        run: RunOptions,
    ) -> anyhow::Result<ProvisionReport> {
        let fetcher = self
            .ctx
            .source_fetcher(run.force)
            .context("Failed to set up artifact fetching")?;
        self.execute_with(session, profile, plan, &fetcher, run)
    }

    /// Run every step, using `fetcher` for the apps step.
    pub fn execute_with<D: Downloader>(
        &self,
        session: &DeviceSession,
        profile: &DeviceProfile,
        plan: &ProvisionPlan,
        fetcher: &SourceFetcher<D>,
        run: RunOptions,
    ) -> anyhow::Result<ProvisionReport> {
        let debloat = DebloatCommand::new(self.ctx);
        let options = DebloatOptions::new(plan.tier.as_str())
            .with_vendor(profile.manufacturer.clone())
            .with_degoogle(plan.degoogle);
        let debloat_plan = debloat.plan(&options)?;
        tracing::info!(tier = %plan.tier, packages = debloat_plan.packages.len(), "provision: debloat");
        let debloat_summary = debloat.execute(session, &debloat_plan, run)?;

        let apps = match &plan.app_set {
            Some(set) => {
                let command = AppsCommand::new(self.ctx);
                let apps_plan = command.plan(set)?;
                tracing::info!(set = %set, entries = apps_plan.entries.len(), "provision: apps");
                let outcome = command.execute_with(session, fetcher, &apps_plan, run)?;
                Some(outcome)
            }
            None => None,
        };

        let settings = match &plan.settings {
            Some(name) => {
                let command = SettingsCommand::new(self.ctx);
                let settings_plan = command.plan(name, Some(profile))?;
                tracing::info!(profile = %settings_plan.profile, "provision: config");
                Some(command.execute(session, &settings_plan, run))
            }
            None => None,
        };

        Ok(ProvisionReport {
            debloat: debloat_summary,
            apps,
            settings,
        })
    }
}
