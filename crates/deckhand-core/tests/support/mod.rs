//! Shared fakes for integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use deckhand_core::apps::{Downloader, FetchError};
use deckhand_core::config::DataLayout;
use deckhand_core::device::{
    BridgeError, DeviceBridge, DeviceInfo, DeviceSession, DeviceState, ShellOutput,
};

pub const SERIAL: &str = "FAKE0001";

/// Write `content` to `path`, creating parent directories.
pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

/// Write a minimal valid APK-like archive.
pub fn write_apk(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let file = std::fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);
    zip.start_file("AndroidManifest.xml", options).unwrap();
    zip.write_all(b"<manifest/>").unwrap();
    zip.finish().unwrap();
}

pub fn layout(root: &Path) -> DataLayout {
    DataLayout::new(root.join("data"), root.join("cache"))
}

/// Observable state behind a [`FakeBridge`].
#[derive(Debug, Default)]
pub struct FakeDevice {
    pub devices: Vec<DeviceInfo>,
    pub props: HashMap<String, String>,
    pub installed: BTreeSet<String>,
    pub rooted: bool,
    /// Packages whose uninstall is rejected
    pub uninstall_rejects: HashSet<String>,
    /// Packages whose disable is rejected
    pub disable_rejects: HashSet<String>,
    /// Artifact file names whose install fails
    pub install_failures: HashSet<String>,
    /// Setting keys whose write fails
    pub setting_failures: HashSet<String>,

    pub uninstalled: Vec<String>,
    pub disabled: Vec<String>,
    pub installs: Vec<PathBuf>,
    pub settings: Vec<(String, String, String)>,
    /// Every mutating call, in order
    pub mutations: Vec<String>,
}

/// In-memory device bridge. Clones share one [`FakeDevice`].
#[derive(Debug, Clone, Default)]
pub struct FakeBridge {
    state: Rc<RefCell<FakeDevice>>,
}

impl FakeBridge {
    pub fn new() -> Self {
        let bridge = Self::default();
        bridge
            .state
            .borrow_mut()
            .devices
            .push(DeviceInfo::new(SERIAL, DeviceState::Device));
        bridge
    }

    pub fn with_installed<I, S>(self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state
            .borrow_mut()
            .installed
            .extend(packages.into_iter().map(Into::into));
        self
    }

    pub fn with_prop(self, key: &str, value: &str) -> Self {
        self.state
            .borrow_mut()
            .props
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn state(&self) -> std::cell::RefMut<'_, FakeDevice> {
        self.state.borrow_mut()
    }

    pub fn session(&self) -> DeviceSession {
        DeviceSession::new(Box::new(self.clone()), SERIAL)
    }
}

fn ok(stdout: impl Into<String>) -> ShellOutput {
    ShellOutput {
        stdout: stdout.into(),
        stderr: String::new(),
        exit_code: Some(0),
    }
}

fn fail(stderr: impl Into<String>) -> ShellOutput {
    ShellOutput {
        stdout: String::new(),
        stderr: stderr.into(),
        exit_code: Some(1),
    }
}

impl DeviceBridge for FakeBridge {
    fn list_devices(&self) -> Result<Vec<DeviceInfo>, BridgeError> {
        Ok(self.state.borrow().devices.clone())
    }

    fn shell(&self, _serial: &str, argv: &[&str]) -> Result<ShellOutput, BridgeError> {
        let mut state = self.state.borrow_mut();
        let output = match argv {
            ["pm", "list", "packages"] => ok(state
                .installed
                .iter()
                .map(|p| format!("package:{p}\n"))
                .collect::<String>()),
            ["pm", "list", "packages", "-e"] => ok(state
                .installed
                .iter()
                .filter(|p| !state.disabled.contains(p))
                .map(|p| format!("package:{p}\n"))
                .collect::<String>()),
            ["pm", "disable-user", "--user", "0", package] => {
                state.mutations.push(format!("disable {package}"));
                if state.disable_rejects.contains(*package) {
                    fail(format!("Error: cannot disable {package}"))
                } else {
                    state.disabled.push(package.to_string());
                    ok(format!("Package {package} new state: disabled-user\n"))
                }
            }
            ["settings", "put", namespace, key, value] => {
                state.mutations.push(format!("settings {namespace} {key}"));
                if state.setting_failures.contains(*key) {
                    fail("Permission denial")
                } else {
                    state
                        .settings
                        .push((namespace.to_string(), key.to_string(), value.to_string()));
                    ok("")
                }
            }
            ["su", "-c", "id"] => {
                if state.rooted {
                    ok("uid=0(root) gid=0(root)\n")
                } else {
                    fail("/system/bin/sh: su: not found")
                }
            }
            _ => ShellOutput {
                stdout: String::new(),
                stderr: format!("unsupported: {}", argv.join(" ")),
                exit_code: Some(127),
            },
        };
        Ok(output)
    }

    fn install_artifact(
        &self,
        _serial: &str,
        path: &Path,
        _allow_replace: bool,
    ) -> Result<(), BridgeError> {
        let mut state = self.state.borrow_mut();
        state.mutations.push(format!("install {}", path.display()));
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if state.install_failures.contains(&name) {
            return Err(BridgeError::CommandFailed {
                command: format!("adb install {}", path.display()),
                message: "Failure [INSTALL_FAILED_INVALID_APK]".to_string(),
            });
        }
        state.installs.push(path.to_path_buf());
        Ok(())
    }

    fn uninstall_package(
        &self,
        _serial: &str,
        package: &str,
        _keep_data: bool,
    ) -> Result<(), BridgeError> {
        let mut state = self.state.borrow_mut();
        state.mutations.push(format!("uninstall {package}"));
        if state.uninstall_rejects.contains(package) {
            return Err(BridgeError::CommandFailed {
                command: format!("pm uninstall -k --user 0 {package}"),
                message: "Failure [DELETE_FAILED_INTERNAL_ERROR]".to_string(),
            });
        }
        state.installed.remove(package);
        state.uninstalled.push(package.to_string());
        Ok(())
    }

    fn get_property(&self, _serial: &str, key: &str) -> Result<String, BridgeError> {
        Ok(self.state.borrow().props.get(key).cloned().unwrap_or_default())
    }
}

/// What a [`FakeDownloader`] writes for a URL.
#[derive(Debug, Clone)]
pub enum Response {
    /// A valid archive
    Apk,
    /// Bytes that are not an archive
    Garbage,
    /// Literal text (for index documents)
    Text(String),
    /// Transfer failure
    Fail,
}

/// Records requested URLs and serves canned responses.
#[derive(Debug)]
pub struct FakeDownloader {
    default: Response,
    routes: HashMap<String, Response>,
    requests: RefCell<Vec<String>>,
}

impl FakeDownloader {
    pub fn new(default: Response) -> Self {
        Self {
            default,
            routes: HashMap::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn route(mut self, url: &str, response: Response) -> Self {
        self.routes.insert(url.to_string(), response);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl Downloader for FakeDownloader {
    fn download(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        self.requests.borrow_mut().push(url.to_string());
        let response = self.routes.get(url).unwrap_or(&self.default);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        match response {
            Response::Apk => write_apk(dest),
            Response::Garbage => std::fs::write(dest, b"<html>not found</html>")?,
            Response::Text(text) => std::fs::write(dest, text)?,
            Response::Fail => {
                return Err(FetchError::Download {
                    url: url.to_string(),
                    reason: "HTTP 404 Not Found".to_string(),
                });
            }
        }
        Ok(())
    }
}
