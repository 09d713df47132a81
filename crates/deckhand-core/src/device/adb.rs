use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use super::{BridgeError, DeviceBridge, DeviceInfo, DeviceState, ShellOutput};

/// [`DeviceBridge`] backed by the `adb` command-line tool.
#[derive(Debug, Clone)]
pub struct AdbBridge {
    adb: PathBuf,
}

impl AdbBridge {
    pub fn new(adb: PathBuf) -> Self {
        Self { adb }
    }

    pub fn tool(&self) -> &Path {
        &self.adb
    }

    /// Check that the tool can be invoked at all.
    pub fn ensure_available(&self) -> Result<(), BridgeError> {
        let output = self.run(None, &["version"])?;
        if !output.status.success() {
            return Err(BridgeError::ToolMissing {
                tool: self.adb.clone(),
            });
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        tracing::debug!(
            version = stdout.lines().next().unwrap_or_default(),
            "adb available"
        );
        Ok(())
    }

    fn run(&self, serial: Option<&str>, args: &[&str]) -> Result<Output, BridgeError> {
        let mut command = Command::new(&self.adb);
        if let Some(serial) = serial {
            command.args(["-s", serial]);
        }
        command.args(args);
        tracing::trace!(tool = %self.adb.display(), ?serial, ?args, "invoking adb");

        command.output().map_err(|e| match e.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => BridgeError::ToolMissing {
                tool: self.adb.clone(),
            },
            _ => BridgeError::Io(e),
        })
    }
}

impl DeviceBridge for AdbBridge {
    fn list_devices(&self) -> Result<Vec<DeviceInfo>, BridgeError> {
        let output = self.run(None, &["devices"])?;
        if !output.status.success() {
            return Err(BridgeError::CommandFailed {
                command: "adb devices".to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(parse_devices(&String::from_utf8_lossy(&output.stdout)))
    }

    fn shell(&self, serial: &str, argv: &[&str]) -> Result<ShellOutput, BridgeError> {
        // The device shell re-splits its arguments, so each one is quoted.
        let quoted: Vec<String> = argv.iter().map(|arg| shell_quote(arg)).collect();
        let mut args = vec!["shell"];
        args.extend(quoted.iter().map(String::as_str));

        let output = self.run(Some(serial), &args)?;
        Ok(ShellOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        })
    }

    fn install_artifact(
        &self,
        serial: &str,
        path: &Path,
        allow_replace: bool,
    ) -> Result<(), BridgeError> {
        let path_arg = path.to_string_lossy();
        let mut args = vec!["install"];
        if allow_replace {
            args.push("-r");
        }
        args.push(&path_arg);

        let output = self.run(Some(serial), &args)?;
        let combined = format!(
            "{}\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        if combined.contains("Success") {
            Ok(())
        } else {
            Err(BridgeError::CommandFailed {
                command: format!("adb install {}", path.display()),
                message: failure_line(&combined),
            })
        }
    }

    fn uninstall_package(
        &self,
        serial: &str,
        package: &str,
        keep_data: bool,
    ) -> Result<(), BridgeError> {
        let mut argv = vec!["pm", "uninstall"];
        if keep_data {
            argv.push("-k");
        }
        argv.extend(["--user", "0", package]);

        let output = self.shell(serial, &argv)?;
        if output.stdout.contains("Success") {
            Ok(())
        } else {
            Err(BridgeError::CommandFailed {
                command: argv.join(" "),
                message: failure_line(&output.combined()),
            })
        }
    }

    fn get_property(&self, serial: &str, key: &str) -> Result<String, BridgeError> {
        let output = self.shell(serial, &["getprop", key])?;
        if !output.success() {
            return Err(BridgeError::CommandFailed {
                command: format!("getprop {key}"),
                message: output.combined(),
            });
        }
        Ok(output.stdout.trim().to_string())
    }
}

/// Parse the output of `adb devices`.
pub fn parse_devices(stdout: &str) -> Vec<DeviceInfo> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("List of devices") && !line.starts_with('*'))
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let serial = parts.next()?;
            let state = parts.next()?;
            Some(DeviceInfo::new(serial, DeviceState::parse(state)))
        })
        .collect()
}

/// Quote one argument for the device-side `sh`.
pub fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

fn failure_line(output: &str) -> String {
    output
        .lines()
        .map(str::trim)
        .find(|line| line.contains("Failure") || line.contains("Exception"))
        .or_else(|| output.lines().map(str::trim).rfind(|l| !l.is_empty()))
        .unwrap_or("no output")
        .to_string()
}
