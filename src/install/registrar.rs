use std::{fmt, fs, io, path::Path};

use super::error::InstallError;
use super::events::{Artifact, Event, EventSink};
use super::manifest::HostDescriptor;

/// Platform contract for manifest registration.
///
/// One implementation per discovery convention: `DirRegistrar` writes
/// manifest files under the user's home directory (macOS/Linux),
/// `RegistryRegistrar` writes a manifest beside the executable and points a
/// registry value at it (Windows). [`Installer`] and [`Uninstaller`] drive
/// either through this trait.
pub trait Registrar {
    /// One discovery location managed by this registrar.
    type Target: fmt::Display;

    /// Snapshot the discovery locations applicable to the current user.
    ///
    /// Zero targets is not an error (nothing is discoverable right now); a
    /// failing enumeration primitive is.
    fn locate_targets(&self, descriptor: &HostDescriptor)
        -> Result<Vec<Self::Target>, InstallError>;

    /// Persist `manifest` at `target`, creating the parent directory and any
    /// registration handle. Overwrites an existing manifest.
    fn write(
        &self,
        target: &Self::Target,
        descriptor: &HostDescriptor,
        manifest: &[u8],
    ) -> Result<(), InstallError>;

    /// Attempt removal of every artifact at `target`. Every artifact is
    /// attempted regardless of prior outcomes.
    fn remove(&self, target: &Self::Target, descriptor: &HostDescriptor) -> Vec<Removal>;

    /// Whether the manifest is currently discoverable at `target`.
    fn verify(&self, target: &Self::Target, descriptor: &HostDescriptor) -> bool;
}

/// Outcome of one removal attempt during uninstall.
pub struct Removal {
    pub artifact: Artifact,
    pub location: String,
    pub outcome: io::Result<()>,
}

/// Writes the manifest at every located target, stopping at the first
/// failure. Targets written before the failure are left in place; targets
/// after it are left untouched.
pub struct Installer<'a, R: Registrar> {
    registrar: &'a R,
    sink: &'a dyn EventSink,
}

impl<'a, R: Registrar> Installer<'a, R> {
    pub fn new(registrar: &'a R, sink: &'a dyn EventSink) -> Self {
        Self { registrar, sink }
    }

    pub fn install(&self, descriptor: &HostDescriptor) -> Result<(), InstallError> {
        let manifest = descriptor.to_manifest_bytes()?;
        let targets = self.registrar.locate_targets(descriptor)?;
        for target in &targets {
            self.registrar.write(target, descriptor, &manifest)?;
            self.sink.emit(&Event::Installed {
                target: target.to_string(),
            });
        }
        Ok(())
    }
}

/// Best-effort removal of every artifact at every located target.
///
/// Never reports an error to the caller: a missing artifact is a normal
/// steady state, and a failing locator leaves nothing to clean up. Failures
/// go to the sink and are dropped.
pub struct Uninstaller<'a, R: Registrar> {
    registrar: &'a R,
    sink: &'a dyn EventSink,
}

impl<'a, R: Registrar> Uninstaller<'a, R> {
    pub fn new(registrar: &'a R, sink: &'a dyn EventSink) -> Self {
        Self { registrar, sink }
    }

    pub fn uninstall(&self, descriptor: &HostDescriptor) {
        let Ok(targets) = self.registrar.locate_targets(descriptor) else {
            return;
        };
        for target in &targets {
            for removal in self.registrar.remove(target, descriptor) {
                let event = match removal.outcome {
                    Ok(()) => Event::Removed {
                        artifact: removal.artifact,
                        location: removal.location,
                    },
                    Err(err) => Event::RemoveFailed {
                        artifact: removal.artifact,
                        location: removal.location,
                        reason: err.to_string(),
                    },
                };
                self.sink.emit(&event);
            }
            self.sink.emit(&Event::Uninstalled {
                target: target.to_string(),
            });
        }
    }
}

/// Filesystem boundary used by the registrars. These three operations are
/// the only points where installation touches the disk, kept behind a trait
/// so tests can stub them.
pub trait ManifestFs {
    fn create_dir_all(&self, dir: &Path, mode: u32) -> io::Result<()>;
    fn write_file(&self, path: &Path, bytes: &[u8], mode: u32) -> io::Result<()>;
    fn remove_file(&self, path: &Path) -> io::Result<()>;
    fn exists(&self, path: &Path) -> bool;
}

/// [`ManifestFs`] backed by `std::fs`. Modes apply on Unix only.
#[derive(Clone, Copy, Debug, Default)]
pub struct RealFs;

impl ManifestFs for RealFs {
    #[cfg(unix)]
    fn create_dir_all(&self, dir: &Path, mode: u32) -> io::Result<()> {
        use std::os::unix::fs::DirBuilderExt;
        fs::DirBuilder::new().recursive(true).mode(mode).create(dir)
    }

    #[cfg(not(unix))]
    fn create_dir_all(&self, dir: &Path, _mode: u32) -> io::Result<()> {
        fs::create_dir_all(dir)
    }

    #[cfg(unix)]
    fn write_file(&self, path: &Path, bytes: &[u8], mode: u32) -> io::Result<()> {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(mode)
            .open(path)?;
        file.write_all(bytes)
    }

    #[cfg(not(unix))]
    fn write_file(&self, path: &Path, bytes: &[u8], _mode: u32) -> io::Result<()> {
        fs::write(path, bytes)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::install::events::MemorySink;
    use std::sync::Mutex;

    /// Registrar double with scripted targets and failures.
    struct ScriptedRegistrar {
        targets: Vec<String>,
        locate_fails: bool,
        fail_write_at: Option<usize>,
        removals_fail: bool,
        writes: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl ScriptedRegistrar {
        fn with_targets(targets: &[&str]) -> Self {
            Self {
                targets: targets.iter().map(|t| t.to_string()).collect(),
                locate_fails: false,
                fail_write_at: None,
                removals_fail: false,
                writes: Mutex::new(Vec::new()),
            }
        }
    }

    impl Registrar for ScriptedRegistrar {
        type Target = String;

        fn locate_targets(
            &self,
            _descriptor: &HostDescriptor,
        ) -> Result<Vec<String>, InstallError> {
            if self.locate_fails {
                return Err(InstallError::Locate(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "root unreadable",
                )));
            }
            Ok(self.targets.clone())
        }

        fn write(
            &self,
            target: &String,
            _descriptor: &HostDescriptor,
            manifest: &[u8],
        ) -> Result<(), InstallError> {
            let mut writes = self.writes.lock().unwrap();
            if self.fail_write_at == Some(writes.len()) {
                return Err(InstallError::Write {
                    path: target.into(),
                    source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
                });
            }
            writes.push((target.clone(), manifest.to_vec()));
            Ok(())
        }

        fn remove(&self, target: &String, descriptor: &HostDescriptor) -> Vec<Removal> {
            let outcome = |artifact, location: String| Removal {
                artifact,
                location,
                outcome: if self.removals_fail {
                    Err(io::Error::new(io::ErrorKind::NotFound, "not found"))
                } else {
                    Ok(())
                },
            };
            vec![
                outcome(Artifact::Manifest, target.clone()),
                outcome(Artifact::Executable, descriptor.path.display().to_string()),
                outcome(
                    Artifact::Checksum,
                    descriptor.checksum_path().display().to_string(),
                ),
            ]
        }

        fn verify(&self, _target: &String, _descriptor: &HostDescriptor) -> bool {
            false
        }
    }

    fn demo() -> HostDescriptor {
        HostDescriptor::new("demo", "/opt/demo/bin")
    }

    #[test]
    fn install_writes_identical_bytes_to_every_target() {
        let registrar = ScriptedRegistrar::with_targets(&["a", "b", "c"]);
        let sink = MemorySink::new();
        let descriptor = demo();

        Installer::new(&registrar, &sink).install(&descriptor).unwrap();

        let writes = registrar.writes.lock().unwrap();
        assert_eq!(writes.len(), 3);
        let expected = descriptor.to_manifest_bytes().unwrap();
        for (_, bytes) in writes.iter() {
            assert_eq!(bytes, &expected);
        }
        assert_eq!(
            sink.lines(),
            vec!["Installed: a", "Installed: b", "Installed: c"]
        );
    }

    #[test]
    fn install_stops_at_first_failing_target() {
        let mut registrar = ScriptedRegistrar::with_targets(&["a", "b", "c"]);
        registrar.fail_write_at = Some(1);
        let sink = MemorySink::new();

        let err = Installer::new(&registrar, &sink)
            .install(&demo())
            .unwrap_err();

        assert!(matches!(err, InstallError::Write { .. }));
        // First target written, second and third untouched.
        let writes = registrar.writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, "a");
        assert_eq!(sink.lines(), vec!["Installed: a"]);
    }

    #[test]
    fn install_propagates_locator_failure_before_any_write() {
        let mut registrar = ScriptedRegistrar::with_targets(&["a"]);
        registrar.locate_fails = true;
        let sink = MemorySink::new();

        let err = Installer::new(&registrar, &sink)
            .install(&demo())
            .unwrap_err();

        assert!(matches!(err, InstallError::Locate(_)));
        assert!(registrar.writes.lock().unwrap().is_empty());
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn install_with_zero_targets_succeeds_silently() {
        let registrar = ScriptedRegistrar::with_targets(&[]);
        let sink = MemorySink::new();
        Installer::new(&registrar, &sink).install(&demo()).unwrap();
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn uninstall_reports_every_attempt_and_never_fails() {
        let mut registrar = ScriptedRegistrar::with_targets(&["a"]);
        registrar.removals_fail = true;
        let sink = MemorySink::new();

        Uninstaller::new(&registrar, &sink).uninstall(&demo());

        let lines = sink.lines();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Could not remove manifest"));
        assert!(lines[1].starts_with("Could not remove executable"));
        assert!(lines[2].starts_with("Could not remove checksum file"));
        assert_eq!(lines[3], "Uninstalled: a");
    }

    #[test]
    fn uninstall_aborts_silently_when_locator_fails() {
        let mut registrar = ScriptedRegistrar::with_targets(&["a"]);
        registrar.locate_fails = true;
        let sink = MemorySink::new();

        Uninstaller::new(&registrar, &sink).uninstall(&demo());

        assert!(sink.lines().is_empty());
    }

    #[test]
    fn uninstall_closes_each_target_with_a_line() {
        let registrar = ScriptedRegistrar::with_targets(&["a", "b"]);
        let sink = MemorySink::new();

        Uninstaller::new(&registrar, &sink).uninstall(&demo());

        let lines = sink.lines();
        assert_eq!(lines.iter().filter(|l| l.starts_with("Uninstalled:")).count(), 2);
        assert_eq!(lines.last().unwrap(), "Uninstalled: b");
    }
}
