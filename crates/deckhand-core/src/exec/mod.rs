//! Execution driver
//!
//! Applies resolved lists to a device one item at a time. A failing item is
//! recorded in the [`RunSummary`] and the batch carries on; only failing to
//! read the device's package list aborts a run.

use std::fmt;

use serde::Serialize;

use crate::apps::{ArtifactInfo, Downloader, ManifestEntry, SourceFetcher, describe_artifact};
use crate::context::RunOptions;
use crate::device::{BridgeError, DeviceSession, SettingPoke};
use crate::list::ResolvedActionSet;

/// One item that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub item: String,
    pub reason: String,
}

impl fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.item, self.reason)
    }
}

/// Counters for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub applied: usize,
    pub skipped: usize,
    pub failed: usize,
    pub failures: Vec<ItemFailure>,
    pub dry_run: bool,
}

impl RunSummary {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    pub fn record_applied(&mut self) {
        self.applied += 1;
    }

    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn record_failure(&mut self, item: impl Into<String>, reason: impl fmt::Display) {
        self.failed += 1;
        self.failures.push(ItemFailure {
            item: item.into(),
            reason: reason.to_string(),
        });
    }

    pub fn total(&self) -> usize {
        self.applied + self.skipped + self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// `removed=7, skipped=3, failed=0`, with a dry-run marker when set.
    pub fn describe(&self, verb: &str) -> String {
        let mut line = format!(
            "{verb}={}, skipped={}, failed={}",
            self.applied, self.skipped, self.failed
        );
        if self.dry_run {
            line.push_str(" (dry run)");
        }
        line
    }
}

/// An artifact that was fetched for installation.
#[derive(Debug, Clone)]
pub struct FetchedArtifact {
    pub entry: ManifestEntry,
    pub info: ArtifactInfo,
}

/// Result of an install batch.
#[derive(Debug, Clone)]
pub struct InstallOutcome {
    pub summary: RunSummary,
    pub artifacts: Vec<FetchedArtifact>,
}

/// Drives a batch against one device session.
pub struct Executor<'a> {
    session: &'a DeviceSession,
    options: RunOptions,
}

impl<'a> Executor<'a> {
    pub fn new(session: &'a DeviceSession, options: RunOptions) -> Self {
        Self { session, options }
    }

    /// Remove every package in `set` that is currently installed and enabled.
    ///
    /// Uninstall keeps user data; when the device rejects it the package is
    /// disabled instead. Already disabled packages count as skipped.
    pub fn remove_packages(&self, set: &ResolvedActionSet) -> Result<RunSummary, BridgeError> {
        let enabled = self.session.enabled_packages()?;
        let mut summary = RunSummary::new(self.options.dry_run);

        for package in set {
            if !enabled.contains(package) {
                tracing::debug!(package = %package, "not installed or already disabled, skipping");
                summary.record_skipped();
                continue;
            }

            if self.options.dry_run {
                tracing::info!(package = %package, "would remove");
                summary.record_applied();
                continue;
            }

            match self.session.uninstall(package, true) {
                Ok(()) => {
                    tracing::info!(package = %package, "removed");
                    summary.record_applied();
                }
                Err(uninstall_err) => match self.session.disable(package) {
                    Ok(()) => {
                        tracing::info!(
                            package = %package,
                            reason = %uninstall_err,
                            "uninstall rejected, disabled instead"
                        );
                        summary.record_applied();
                    }
                    Err(disable_err) => {
                        tracing::warn!(package = %package, error = %disable_err, "removal failed");
                        summary.record_failure(
                            package.as_str(),
                            format!("{uninstall_err}; disable: {disable_err}"),
                        );
                    }
                },
            }
        }

        Ok(summary)
    }

    /// Fetch and install each entry.
    ///
    /// Catalog entries whose package is already installed are skipped unless
    /// forced. In a dry run nothing is fetched.
    pub fn install_entries<D: Downloader>(
        &self,
        fetcher: &SourceFetcher<D>,
        entries: &[ManifestEntry],
    ) -> Result<InstallOutcome, BridgeError> {
        let installed = self.session.installed_packages()?;
        let mut summary = RunSummary::new(self.options.dry_run);
        let mut artifacts = Vec::new();

        for entry in entries {
            let item = entry.to_string();

            let already_installed = entry
                .package_id()
                .is_some_and(|package| installed.contains(package));
            if already_installed && !self.options.force {
                tracing::debug!(entry = %item, "already installed, skipping");
                summary.record_skipped();
                continue;
            }

            if self.options.dry_run {
                tracing::info!(entry = %item, "would install");
                summary.record_applied();
                continue;
            }

            let path = match fetcher.fetch(entry) {
                Ok(path) => path,
                Err(e) => {
                    tracing::warn!(entry = %item, error = %e, "fetch failed");
                    summary.record_failure(item, e);
                    continue;
                }
            };

            match describe_artifact(&path) {
                Ok(info) => {
                    tracing::info!(
                        entry = %item,
                        size = info.size,
                        blake3 = %info.digest,
                        "artifact ready"
                    );
                    artifacts.push(FetchedArtifact {
                        entry: entry.clone(),
                        info,
                    });
                }
                Err(e) => tracing::debug!(path = %path.display(), error = %e, "could not hash artifact"),
            }

            match self.session.install(&path, true) {
                Ok(()) => {
                    tracing::info!(entry = %item, "installed");
                    summary.record_applied();
                }
                Err(e) => {
                    tracing::warn!(entry = %item, error = %e, "install failed");
                    summary.record_failure(item, e);
                }
            }
        }

        Ok(InstallOutcome { summary, artifacts })
    }

    /// Write each setting; failures are counted, never raised.
    pub fn apply_settings(&self, pokes: &[SettingPoke]) -> RunSummary {
        let mut summary = RunSummary::new(self.options.dry_run);

        for poke in pokes {
            if self.options.dry_run {
                tracing::info!(setting = %poke, "would apply");
                summary.record_applied();
                continue;
            }

            let outcome = self.session.put_setting(poke);
            match outcome.error() {
                None => {
                    tracing::debug!(setting = %poke, "applied");
                    summary.record_applied();
                }
                Some(e) => {
                    tracing::warn!(setting = %poke, error = %e, "setting not applied");
                    summary.record_failure(format!("{} {}", poke.namespace, poke.key), e);
                }
            }
        }

        summary
    }
}
