//! Detect command implementation.

use anyhow::Context;

use crate::context::AppContext;
use crate::device::{DeviceProfile, DeviceSession};

pub struct DetectCommand<'a> {
    ctx: &'a AppContext,
}

impl<'a> DetectCommand<'a> {
    pub fn new(ctx: &'a AppContext) -> Self {
        Self { ctx }
    }

    pub fn execute(&self, session: &DeviceSession) -> anyhow::Result<DeviceProfile> {
        DeviceProfile::detect(session, self.ctx.layout())
            .with_context(|| format!("Failed to read device properties from {}", session.serial()))
    }
}
