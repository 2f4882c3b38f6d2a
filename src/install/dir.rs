use std::{
    fmt,
    path::{Path, PathBuf},
};

use super::config;
use super::error::InstallError;
use super::events::Artifact;
use super::manifest::HostDescriptor;
use super::registrar::{ManifestFs, RealFs, Registrar, Removal};

const DIR_MODE: u32 = 0o755;
const FILE_MODE: u32 = 0o644;

/// A manifest file path inside one matched `NativeMessagingHosts` directory.
pub struct DirTarget(PathBuf);

impl DirTarget {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for DirTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Registrar for the directory discovery convention (macOS and Linux).
///
/// Chrome probes per-user `NativeMessagingHosts` directories, so a target is
/// a manifest file path inside each channel directory matched under the
/// home directory. There is no system-wide location in this convention,
/// which is why the root user gets an empty target set rather than an error.
pub struct DirRegistrar<F = RealFs> {
    fs: F,
    home: Option<PathBuf>,
    uid: u32,
}

impl DirRegistrar<RealFs> {
    /// Registrar for the current user.
    pub fn new() -> Self {
        // Real uid, not effective: running under sudo must not register
        // into root's (nonexistent) browser profile.
        Self {
            fs: RealFs,
            home: dirs::home_dir(),
            uid: unsafe { libc::getuid() },
        }
    }
}

impl Default for DirRegistrar<RealFs> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: ManifestFs> DirRegistrar<F> {
    /// Registrar over an explicit environment snapshot. Used by tests and by
    /// embedders that resolve the user themselves.
    pub fn with_env(fs: F, home: Option<PathBuf>, uid: u32) -> Self {
        Self { fs, home, uid }
    }
}

impl<F: ManifestFs> Registrar for DirRegistrar<F> {
    type Target = DirTarget;

    fn locate_targets(
        &self,
        descriptor: &HostDescriptor,
    ) -> Result<Vec<DirTarget>, InstallError> {
        if self.uid == 0 {
            return Ok(Vec::new());
        }
        let Some(home) = &self.home else {
            return Ok(Vec::new());
        };

        let pattern = home.join(config::chrome().dir_glob());
        let pattern = pattern.to_string_lossy().into_owned();
        let matches = glob::glob(&pattern).map_err(|source| InstallError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;

        let mut targets = Vec::new();
        for entry in matches {
            let dir = entry.map_err(|err| InstallError::Locate(err.into_error()))?;
            targets.push(DirTarget(dir.join(descriptor.manifest_file_name())));
        }
        Ok(targets)
    }

    fn write(
        &self,
        target: &DirTarget,
        _descriptor: &HostDescriptor,
        manifest: &[u8],
    ) -> Result<(), InstallError> {
        let write_err = |source| InstallError::Write {
            path: target.0.clone(),
            source,
        };
        if let Some(dir) = target.0.parent() {
            self.fs.create_dir_all(dir, DIR_MODE).map_err(write_err)?;
        }
        self.fs
            .write_file(&target.0, manifest, FILE_MODE)
            .map_err(write_err)
    }

    fn remove(&self, target: &DirTarget, descriptor: &HostDescriptor) -> Vec<Removal> {
        let checksum = descriptor.checksum_path();
        vec![
            Removal {
                artifact: Artifact::Manifest,
                location: target.0.display().to_string(),
                outcome: self.fs.remove_file(&target.0),
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

    fn verify(&self, target: &DirTarget, _descriptor: &HostDescriptor) -> bool {
        self.fs.exists(&target.0)
    }
}
