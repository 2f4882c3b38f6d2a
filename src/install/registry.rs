use std::{
    fmt, io,
    path::{Path, PathBuf},
};

use super::config;
use super::error::InstallError;
use super::events::Artifact;
use super::manifest::HostDescriptor;
use super::registrar::{ManifestFs, Registrar, Removal};

const DIR_MODE: u32 = 0o755;
const FILE_MODE: u32 = 0o644;

/// Registry primitives used by [`RegistryRegistrar`]. Key paths are
/// relative to HKEY_CURRENT_USER. Implemented by `WinRegistry` on Windows
/// and by test doubles elsewhere.
pub trait RegistryOps {
    /// Names of the subkeys directly under `root`. A missing root surfaces
    /// as `io::ErrorKind::NotFound`.
    fn subkey_names(&self, root: &str) -> io::Result<Vec<String>>;

    /// Create-or-open `key` and set its default value. An existing key is
    /// opened, not an error.
    fn set_default_value(&self, key: &str, value: &str) -> io::Result<()>;

    /// Delete `key` and its values.
    fn delete_key(&self, key: &str) -> io::Result<()>;
}

/// One installed browser channel found under the vendor registry root.
#[derive(Debug)]
pub struct RegistryTarget {
    channel_key: String,
}

impl RegistryTarget {
    /// Registration key whose default value points the browser at the
    /// manifest file: `<channel>\NativeMessagingHosts\<name>`.
    pub fn registration_key(&self, name: &str) -> String {
        format!(r"{}\NativeMessagingHosts\{}", self.channel_key, name)
    }
}

impl fmt::Display for RegistryTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, r"HKCU\{}", self.channel_key)
    }
}

/// Registrar for the registry discovery convention (Windows).
///
/// The manifest lives beside the executable; a per-channel registry value
/// under HKCU points the browser at it. Generic over the registry and
/// filesystem boundaries so the orchestration is testable on any OS.
pub struct RegistryRegistrar<R, F> {
    registry: R,
    fs: F,
}

impl<R: RegistryOps, F: ManifestFs> RegistryRegistrar<R, F> {
    pub fn new(registry: R, fs: F) -> Self {
        Self { registry, fs }
    }

    fn manifest_path(descriptor: &HostDescriptor) -> PathBuf {
        let dir = descriptor.path.parent().unwrap_or_else(|| Path::new(""));
        dir.join(descriptor.manifest_file_name())
    }
}

impl<R: RegistryOps, F: ManifestFs> Registrar for RegistryRegistrar<R, F> {
    type Target = RegistryTarget;

    fn locate_targets(
        &self,
        _descriptor: &HostDescriptor,
    ) -> Result<Vec<RegistryTarget>, InstallError> {
        let vendor = config::chrome();
        let names = match self.registry.subkey_names(&vendor.registry_root) {
            Ok(names) => names,
            // No vendor key means no browser channel installed, which is a
            // valid zero-target state.
            Err(err) if err.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(InstallError::Locate(err)),
        };
        Ok(names
            .into_iter()
            .filter(|name| name.starts_with(&vendor.channel_prefix))
            .map(|name| RegistryTarget {
                channel_key: format!(r"{}\{}", vendor.registry_root, name),
            })
            .collect())
    }

    fn write(
        &self,
        target: &RegistryTarget,
        descriptor: &HostDescriptor,
        manifest: &[u8],
    ) -> Result<(), InstallError> {
        let path = Self::manifest_path(descriptor);
        let write_err = |source| InstallError::Write {
            path: path.clone(),
            source,
        };
        if let Some(dir) = path.parent() {
            self.fs.create_dir_all(dir, DIR_MODE).map_err(write_err)?;
        }
        self.fs
            .write_file(&path, manifest, FILE_MODE)
            .map_err(write_err)?;

        let key = target.registration_key(&descriptor.name);
        self.registry
            .set_default_value(&key, &path.to_string_lossy())
            .map_err(|source| InstallError::Register { key: key.clone(), source })
    }

    fn remove(&self, target: &RegistryTarget, descriptor: &HostDescriptor) -> Vec<Removal> {
        let key = target.registration_key(&descriptor.name);
        let manifest = Self::manifest_path(descriptor);
        let checksum = descriptor.checksum_path();
        vec![
            Removal {
                artifact: Artifact::RegistryKey,
                location: format!(r"HKCU\{key}"),
                outcome: self.registry.delete_key(&key),
            },
            Removal {
                artifact: Artifact::Manifest,
                location: manifest.display().to_string(),
                outcome: self.fs.remove_file(&manifest),
            },
            Removal {
                artifact: Artifact::Executable,
                location: descriptor.path.display().to_string(),
                outcome: self.fs.remove_file(&descriptor.path),
            },
            Removal {
                artifact: Artifact::Checksum,
                location: checksum.display().to_string(),
                outcome: self.fs.remove_file(&checksum),
            },
        ]
    }

    fn verify(&self, _target: &RegistryTarget, descriptor: &HostDescriptor) -> bool {
        self.fs.exists(&Self::manifest_path(descriptor))
    }
}
