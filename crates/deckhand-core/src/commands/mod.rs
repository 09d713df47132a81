//! High-level commands for deckhand operations.
//!
//! Each command splits into a read-only planning step and an execution step
//! against a [`DeviceSession`], so frontends can show the plan and ask for
//! confirmation in between.

pub mod apps;
pub mod debloat;
pub mod detect;
pub mod provision;
pub mod settings;

use anyhow::Context;

use crate::context::AppContext;
use crate::device::DeviceSession;

pub use apps::{AppsCommand, AppsPlan};
pub use debloat::{DebloatCommand, DebloatOptions, DebloatPlan};
pub use detect::DetectCommand;
pub use provision::{ProvisionCommand, ProvisionPlan, ProvisionReport};
pub use settings::{SettingsCommand, SettingsPlan};

/// Open a session on the device selected by `serial`, the configured serial,
/// or the only attached device.
pub fn connect(ctx: &AppContext, serial: Option<&str>) -> anyhow::Result<DeviceSession> {
    let bridge = ctx.adb_bridge();
    bridge.ensure_available()?;
    let preferred = serial.or(ctx.configured_serial());
    DeviceSession::connect(Box::new(bridge), preferred).context("Failed to select a device")
}
