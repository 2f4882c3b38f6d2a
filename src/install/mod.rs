//! Manifest registration: locate the browser's discovery targets for the
//! current user and write or remove the native-messaging host manifest at
//! each of them.

pub mod config;
pub mod error;
pub mod events;
pub mod manifest;
pub mod registrar;
pub mod registry;

#[cfg(unix)]
pub mod dir;

#[cfg(windows)]
pub mod winreg;

pub use error::*;
pub use events::{Artifact, Event, EventSink, TracingSink};
pub use manifest::*;
pub use registrar::*;
