use std::fmt;

/// One installation artifact subject to removal during uninstall.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Artifact {
    /// Registration key pointing the browser at the manifest (Windows only).
    RegistryKey,
    /// The manifest file itself.
    Manifest,
    /// The host executable.
    Executable,
    /// The checksum file the packaging step leaves beside the executable.
    Checksum,
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Artifact::RegistryKey => "registry key",
            Artifact::Manifest => "manifest",
            Artifact::Executable => "executable",
            Artifact::Checksum => "checksum file",
        };
        f.write_str(name)
    }
}

/// A diagnostic event emitted while installing or uninstalling.
///
/// The `Display` rendering is the human-readable line the caller's sink is
/// expected to surface.
#[derive(Clone, Debug)]
pub enum Event {
    /// A manifest (and registration handle, where applicable) was written.
    Installed { target: String },
    /// An artifact was removed.
    Removed { artifact: Artifact, location: String },
    /// An artifact could not be removed; uninstall continues regardless.
    RemoveFailed {
        artifact: Artifact,
        location: String,
        reason: String,
    },
    /// All removal attempts for one target completed.
    Uninstalled { target: String },
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Installed { target } => write!(f, "Installed: {target}"),
            Event::Removed { artifact, location } => {
                write!(f, "Removed {artifact}: {location}")
            }
            Event::RemoveFailed {
                artifact,
                location,
                reason,
            } => write!(f, "Could not remove {artifact} {location}: {reason}"),
            Event::Uninstalled { target } => write!(f, "Uninstalled: {target}"),
        }
    }
}

/// Receives diagnostic events from install and uninstall.
///
/// The sink is passed explicitly instead of writing to process-global
/// logging state. A native-messaging host owns stdout for the wire protocol,
/// so where these lines end up is strictly the caller's decision.
pub trait EventSink {
    fn emit(&self, event: &Event);
}

/// Default sink: forwards events to the `tracing` facade, on the assumption
/// that the host process has a subscriber writing to stderr or a file.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &Event) {
        match event {
            Event::RemoveFailed { .. } => tracing::warn!("{event}"),
            _ => tracing::info!("{event}"),
        }
    }
}

#[cfg(test)]
pub(crate) struct MemorySink(pub std::sync::Mutex<Vec<Event>>);

#[cfg(test)]
impl MemorySink {
    pub fn new() -> Self {
        Self(std::sync::Mutex::new(Vec::new()))
    }

    pub fn lines(&self) -> Vec<String> {
        self.0.lock().unwrap().iter().map(Event::to_string).collect()
    }
}

#[cfg(test)]
impl EventSink for MemorySink {
    fn emit(&self, event: &Event) {
        self.0.lock().unwrap().push(event.clone());
    }
}
