//! Apps command implementation.
//!
//! Resolves an app-set manifest and installs each entry.

use anyhow::Context;

use crate::apps::{Downloader, ManifestEntry, SourceFetcher};
use crate::context::{AppContext, RunOptions};
use crate::device::DeviceSession;
use crate::exec::{Executor, InstallOutcome};

/// A resolved app set.
#[derive(Debug, Clone)]
pub struct AppsPlan {
    pub set: String,
    pub entries: Vec<ManifestEntry>,
}

pub struct AppsCommand<'a> {
    ctx: &'a AppContext,
}

impl<'a> AppsCommand<'a> {
    pub fn new(ctx: &'a AppContext) -> Self {
        Self { ctx }
    }

    /// Names of the app sets on disk.
    pub fn list_sets(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.ctx.manifest_resolver().available_sets()?)
    }

    /// Resolve a set; a missing manifest is an error.
    pub fn plan(&self, set: &str) -> anyhow::Result<AppsPlan> {
        let entries = self.ctx.manifest_resolver().resolve(set)?;
        Ok(AppsPlan {
            set: set.to_string(),
            entries,
        })
    }

    /// Install with the HTTP-backed fetcher from the context.
    pub fn execute(
        &self,
        session: &DeviceSession,
        plan: &AppsPlan,
        run: RunOptions,
    ) -> anyhow::Result<InstallOutcome> {
        let fetcher = self
            .ctx
            .source_fetcher(run.force)
            .context("Failed to set up artifact fetching")?;
        self.execute_with(session, &fetcher, plan, run)
    }

    pub fn execute_with<D: Downloader>(
        &self,
        session: &DeviceSession,
        fetcher: &SourceFetcher<D>,
        plan: &AppsPlan,
        run: RunOptions,
    ) -> anyhow::Result<InstallOutcome> {
        let outcome = Executor::new(session, run).install_entries(fetcher, &plan.entries)?;
        Ok(outcome)
    }
}
