use std::{ffi::OsString, path::PathBuf};

use serde::{Deserialize, Serialize};

use super::error::InstallError;
use super::events::{EventSink, TracingSink};
use super::registrar::{Installer, Registrar, Uninstaller};

/// The native-messaging host descriptor persisted as the manifest.
///
/// Field order matches the manifest schema Chrome documents; `install`
/// renders it once with two-space indentation and writes the identical bytes
/// to every target, so re-installing is byte-stable. Beyond `name` and
/// `path` the fields are pass-through data for the browser.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HostDescriptor {
    /// Application identifier. Names the manifest file and, on Windows, the
    /// registration key leaf.
    pub name: String,
    pub description: String,
    /// Absolute path to the companion executable.
    pub path: PathBuf,
    #[serde(rename = "type")]
    pub transport: String,
    pub allowed_origins: Vec<String>,
}

impl HostDescriptor {
    /// Descriptor with the `stdio` transport and no allowed origins.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            path: path.into(),
            transport: "stdio".to_string(),
            allowed_origins: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// `chrome-extension://<id>/` origins allowed to launch the host.
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = origins;
        self
    }

    /// Canonical manifest rendering: two-space-indented JSON in declaration
    /// field order.
    pub fn to_manifest_bytes(&self) -> Result<Vec<u8>, InstallError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// File name the browser expects: `<name>.json`.
    pub fn manifest_file_name(&self) -> String {
        format!("{}.json", self.name)
    }

    /// The checksum file the packaging step leaves beside the executable.
    pub fn checksum_path(&self) -> PathBuf {
        let mut path = OsString::from(self.path.as_os_str());
        path.push(".chk");
        PathBuf::from(path)
    }
}

#[cfg(unix)]
fn platform_registrar() -> super::dir::DirRegistrar {
    super::dir::DirRegistrar::new()
}

#[cfg(windows)]
fn platform_registrar(
) -> super::registry::RegistryRegistrar<super::winreg::WinRegistry, super::registrar::RealFs> {
    super::registry::RegistryRegistrar::new(super::winreg::WinRegistry, super::registrar::RealFs)
}

/// Install the manifest at every discovery location applicable to the
/// current user, reporting progress to `tracing`.
///
/// Stops at the first failure; targets already written stay written.
pub fn install(descriptor: &HostDescriptor) -> Result<(), InstallError> {
    install_with(descriptor, &TracingSink)
}

/// [`install`] with an explicit event sink.
pub fn install_with(
    descriptor: &HostDescriptor,
    sink: &dyn EventSink,
) -> Result<(), InstallError> {
    let registrar = platform_registrar();
    Installer::new(&registrar, sink).install(descriptor)
}

/// Best-effort removal of every installation artifact at every discovery
/// location: registration key (Windows), manifest, executable, checksum
/// file.
///
/// Never fails. A missing artifact is an expected outcome, and a failing
/// locator means there is nothing to clean up.
pub fn uninstall(descriptor: &HostDescriptor) {
    uninstall_with(descriptor, &TracingSink)
}

/// [`uninstall`] with an explicit event sink.
pub fn uninstall_with(descriptor: &HostDescriptor, sink: &dyn EventSink) {
    let registrar = platform_registrar();
    Uninstaller::new(&registrar, sink).uninstall(descriptor)
}

/// Whether the manifest is present at every currently-applicable target.
///
/// `Ok(false)` when no target exists at all (for example, nothing to
/// discover for the root user on macOS/Linux).
pub fn verify_installed(descriptor: &HostDescriptor) -> Result<bool, InstallError> {
    let registrar = platform_registrar();
    let targets = registrar.locate_targets(descriptor)?;
    if targets.is_empty() {
        return Ok(false);
    }
    Ok(targets
        .iter()
        .all(|target| registrar.verify(target, descriptor)))
}
