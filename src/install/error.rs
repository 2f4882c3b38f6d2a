use std::{io, path::PathBuf};
use thiserror::Error;

/// Errors surfaced by [`install`](crate::install::install) and
/// [`verify_installed`](crate::install::verify_installed).
///
/// Uninstall never returns these. Removal failures are reported to the event
/// sink and dropped, because a missing artifact is a normal steady state.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The descriptor could not be rendered to manifest JSON. Raised before
    /// any target is touched.
    #[error("failed to serialize host manifest: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The manifest-directory glob pattern is malformed.
    #[error("invalid manifest location pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },

    /// Target enumeration itself failed: an unreadable glob match, or a
    /// registry root that exists but cannot be read.
    #[error("failed to enumerate install targets: {0}")]
    Locate(#[source] io::Error),

    /// Directory creation or manifest write failed.
    #[error("failed to write manifest {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    /// Registration key creation or value set failed.
    #[error(r"failed to register HKCU\{key}: {source}")]
    Register { key: String, source: io::Error },
}
