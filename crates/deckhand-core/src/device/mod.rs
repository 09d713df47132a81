//! Device control
//!
//! The device is reached through a [`DeviceBridge`]: a small capability set
//! (list devices, run shell commands, install/uninstall, read properties).
//! [`AdbBridge`] implements it on top of the `adb` binary; tests substitute
//! an in-memory fake.

pub mod adb;
pub mod profile;
pub mod settings;

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

pub use adb::AdbBridge;
pub use profile::{DeviceProfile, VendorSkin};
pub use settings::{SettingNamespace, SettingPoke, SettingsError};

/// Connection state reported for an attached device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceState {
    Device,
    Unauthorized,
    Offline,
    Other(String),
}

impl DeviceState {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "device" => Self::Device,
            "unauthorized" => Self::Unauthorized,
            "offline" => Self::Offline,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device => f.write_str("device"),
            Self::Unauthorized => f.write_str("unauthorized"),
            Self::Offline => f.write_str("offline"),
            Self::Other(s) => f.write_str(s),
        }
    }
}

/// An attached device as listed by the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub serial: String,
    pub state: DeviceState,
}

impl DeviceInfo {
    pub fn new(serial: impl Into<String>, state: DeviceState) -> Self {
        Self {
            serial: serial.into(),
            state,
        }
    }
}

/// Captured result of a shell command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl ShellOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// stdout and stderr joined, trimmed.
    pub fn combined(&self) -> String {
        format!("{}\n{}", self.stdout.trim(), self.stderr.trim())
            .trim()
            .to_string()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("device bridge tool not found: {} (is adb installed and on PATH?)", tool.display())]
    ToolMissing { tool: PathBuf },

    #[error("no device connected")]
    NoDevice,

    #[error("device {serial} is unauthorized; accept the USB debugging prompt on the device")]
    Unauthorized { serial: String },

    #[error("multiple devices connected ({}); pick one with --serial", serials.join(", "))]
    MultipleDevices { serials: Vec<String> },

    #[error("device {serial} is not connected")]
    DeviceNotFound { serial: String },

    #[error("`{command}` failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Capabilities consumed from the device-control channel.
pub trait DeviceBridge {
    fn list_devices(&self) -> Result<Vec<DeviceInfo>, BridgeError>;

    fn shell(&self, serial: &str, argv: &[&str]) -> Result<ShellOutput, BridgeError>;

    fn install_artifact(
        &self,
        serial: &str,
        path: &Path,
        allow_replace: bool,
    ) -> Result<(), BridgeError>;

    fn uninstall_package(
        &self,
        serial: &str,
        package: &str,
        keep_data: bool,
    ) -> Result<(), BridgeError>;

    fn get_property(&self, serial: &str, key: &str) -> Result<String, BridgeError>;

    /// Disable a package for the primary user.
    fn disable_package(&self, serial: &str, package: &str) -> Result<(), BridgeError> {
        let argv = ["pm", "disable-user", "--user", "0", package];
        let output = self.shell(serial, &argv)?;
        if output.success() && output.stdout.contains("disabled") {
            Ok(())
        } else {
            Err(BridgeError::CommandFailed {
                command: argv.join(" "),
                message: output.combined(),
            })
        }
    }
}

/// Outcome of an operation the caller is allowed to ignore.
///
/// Unlike `Result`, dropping this value raises no warning. Use it for
/// fire-and-forget device pokes; anything whose failure must be observed
/// returns `Result<_, BridgeError>`.
#[derive(Debug)]
pub struct BestEffort(Result<(), BridgeError>);

impl BestEffort {
    pub fn from_result(result: Result<(), BridgeError>) -> Self {
        Self(result)
    }

    pub fn succeeded(&self) -> bool {
        self.0.is_ok()
    }

    pub fn error(&self) -> Option<&BridgeError> {
        self.0.as_ref().err()
    }

    pub fn into_result(self) -> Result<(), BridgeError> {
        self.0
    }
}

/// Pick the device to operate on.
///
/// A preferred serial must be attached and ready. Without one, exactly one
/// ready device must be attached.
pub fn select_device(
    bridge: &dyn DeviceBridge,
    preferred: Option<&str>,
) -> Result<String, BridgeError> {
    let devices = bridge.list_devices()?;

    if let Some(serial) = preferred {
        return match devices.iter().find(|d| d.serial == serial) {
            Some(d) if d.state == DeviceState::Device => Ok(d.serial.clone()),
            Some(d) if d.state == DeviceState::Unauthorized => Err(BridgeError::Unauthorized {
                serial: d.serial.clone(),
            }),
            _ => Err(BridgeError::DeviceNotFound {
                serial: serial.to_string(),
            }),
        };
    }

    let ready: Vec<&DeviceInfo> = devices
        .iter()
        .filter(|d| d.state == DeviceState::Device)
        .collect();

    match ready.as_slice() {
        [only] => Ok(only.serial.clone()),
        [] => match devices.iter().find(|d| d.state == DeviceState::Unauthorized) {
            Some(d) => Err(BridgeError::Unauthorized {
                serial: d.serial.clone(),
            }),
            None => Err(BridgeError::NoDevice),
        },
        many => Err(BridgeError::MultipleDevices {
            serials: many.iter().map(|d| d.serial.clone()).collect(),
        }),
    }
}

/// A bridge bound to one device serial.
pub struct DeviceSession {
    bridge: Box<dyn DeviceBridge>,
    serial: String,
}

impl fmt::Debug for DeviceSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceSession")
            .field("serial", &self.serial)
            .finish_non_exhaustive()
    }
}

impl DeviceSession {
    pub fn new(bridge: Box<dyn DeviceBridge>, serial: impl Into<String>) -> Self {
        Self {
            bridge,
            serial: serial.into(),
        }
    }

    /// Select a device on `bridge` and bind to it.
    pub fn connect(
        bridge: Box<dyn DeviceBridge>,
        preferred: Option<&str>,
    ) -> Result<Self, BridgeError> {
        let serial = select_device(bridge.as_ref(), preferred)?;
        tracing::info!(serial = %serial, "using device");
        Ok(Self::new(bridge, serial))
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn shell(&self, argv: &[&str]) -> Result<ShellOutput, BridgeError> {
        self.bridge.shell(&self.serial, argv)
    }

    pub fn get_property(&self, key: &str) -> Result<String, BridgeError> {
        self.bridge.get_property(&self.serial, key)
    }

    pub fn install(&self, path: &Path, allow_replace: bool) -> Result<(), BridgeError> {
        self.bridge.install_artifact(&self.serial, path, allow_replace)
    }

    pub fn uninstall(&self, package: &str, keep_data: bool) -> Result<(), BridgeError> {
        self.bridge.uninstall_package(&self.serial, package, keep_data)
    }

    pub fn disable(&self, package: &str) -> Result<(), BridgeError> {
        self.bridge.disable_package(&self.serial, package)
    }

    /// Packages currently installed for the primary user, disabled or not.
    pub fn installed_packages(&self) -> Result<HashSet<String>, BridgeError> {
        self.list_packages(&["pm", "list", "packages"])
    }

    /// Installed packages that are not disabled.
    pub fn enabled_packages(&self) -> Result<HashSet<String>, BridgeError> {
        self.list_packages(&["pm", "list", "packages", "-e"])
    }

    fn list_packages(&self, argv: &[&str]) -> Result<HashSet<String>, BridgeError> {
        let output = self.shell(argv)?;
        if !output.success() {
            return Err(BridgeError::CommandFailed {
                command: argv.join(" "),
                message: output.combined(),
            });
        }
        Ok(parse_package_list(&output.stdout))
    }

    /// Write one settings value; failures are reported, not raised.
    pub fn put_setting(&self, poke: &SettingPoke) -> BestEffort {
        let argv = [
            "settings",
            "put",
            poke.namespace.as_str(),
            poke.key.as_str(),
            poke.value.as_str(),
        ];
        let result = self.shell(&argv).and_then(|output| {
            if output.success() {
                Ok(())
            } else {
                Err(BridgeError::CommandFailed {
                    command: argv.join(" "),
                    message: output.combined(),
                })
            }
        });
        BestEffort::from_result(result)
    }
}

/// Parse `pm list packages` output (`package:<id>` per line).
pub fn parse_package_list(stdout: &str) -> HashSet<String> {
    stdout
        .lines()
        .filter_map(|line| line.trim().strip_prefix("package:"))
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect()
}
