//! Config command implementation.
//!
//! Applies a device settings profile.

use crate::context::{AppContext, RunOptions};
use crate::device::settings::load_profile;
use crate::device::{DeviceProfile, DeviceSession, SettingPoke};
use crate::exec::{Executor, RunSummary};

/// Profile name that selects the detected device's suggested profile.
pub const AUTO_PROFILE: &str = "auto";

#[derive(Debug, Clone)]
pub struct SettingsPlan {
    pub profile: String,
    pub pokes: Vec<SettingPoke>,
}

pub struct SettingsCommand<'a> {
    ctx: &'a AppContext,
}

impl<'a> SettingsCommand<'a> {
    pub fn new(ctx: &'a AppContext) -> Self {
        Self { ctx }
    }

    /// Resolve `name` (or `auto`) to a profile and load it.
    pub fn plan(
        &self,
        name: &str,
        device: Option<&DeviceProfile>,
    ) -> anyhow::Result<SettingsPlan> {
        let profile = if name == AUTO_PROFILE {
            device
                .and_then(|d| d.suggested_settings.clone())
                .ok_or_else(|| anyhow::anyhow!("No settings profile matches this device"))?
        } else {
            name.to_string()
        };

        let pokes = load_profile(self.ctx.layout(), &profile)?;
        Ok(SettingsPlan { profile, pokes })
    }

    pub fn execute(
        &self,
        session: &DeviceSession,
        plan: &SettingsPlan,
        run: RunOptions,
    ) -> RunSummary {
        Executor::new(session, run).apply_settings(&plan.pokes)
    }
}
