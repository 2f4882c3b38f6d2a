//! # hostreg
//!
//! Register a browser **native-messaging host**: put the host manifest where
//! Chrome discovers it, take it back out again, and speak the framed stdio
//! protocol in between.
//!
//! A native-messaging host is an external executable a browser extension can
//! launch and exchange framed JSON messages with over stdin/stdout. Before
//! any of that works, the browser has to *find* the host, and the two
//! desktop platforms disagree on how:
//!
//! - **macOS / Linux**: a JSON manifest named `<host>.json` inside a
//!   per-user `NativeMessagingHosts` directory under the home directory.
//! - **Windows**: a registry value under
//!   `HKCU\SOFTWARE\Google\<Channel>\NativeMessagingHosts\<host>` pointing
//!   at a manifest file placed beside the executable.
//!
//! The [`install`] module reconciles both behind one
//! [`Registrar`](install::Registrar) contract: locate every applicable
//! discovery target for the current user (several browser channels may be
//! installed), write the manifest and registration handle at each, and
//! remove everything best-effort on uninstall.
//!
//! ## Installing
//!
//! ```no_run
//! use hostreg::{install, HostDescriptor};
//!
//! let descriptor = HostDescriptor::new("com.example.host", "/opt/example/host")
//!     .with_description("Example native messaging host")
//!     .with_allowed_origins(vec![
//!         "chrome-extension://aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa/".to_string(),
//!     ]);
//!
//! install(&descriptor)?;
//! # Ok::<(), hostreg::InstallError>(())
//! ```
//!
//! Install is transactional per target but not across targets: the first
//! failure aborts with the earlier targets written and the later ones
//! untouched. Re-running it rewrites byte-identical manifests, so
//! install-over-install is safe.
//!
//! ## Uninstalling
//!
//! ```no_run
//! use hostreg::{uninstall, HostDescriptor};
//!
//! let descriptor = HostDescriptor::new("com.example.host", "/opt/example/host");
//! uninstall(&descriptor);
//! ```
//!
//! [`uninstall`] never fails. Every artifact (registration key, manifest,
//! executable, checksum file) is attempted independently; uninstalling a
//! host that was never installed just reports each missing artifact to the
//! diagnostic sink. Pass your own [`EventSink`](install::EventSink) to
//! [`install::uninstall_with`] to capture those lines; the default forwards
//! them to `tracing`.
//!
//! ## Being a host
//!
//! The [`host`] module carries the wire side: 4-byte native-endian length
//! prefix plus UTF-8 JSON, with Chrome's size caps enforced. One rule
//! matters above all others: **never write logs to stdout**. Stdout belongs
//! to the protocol; use stderr or a file.
//!
//! ```no_run
//! use hostreg::host::event_loop;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     event_loop(|raw| async move {
//!         let _request: serde_json::Value = serde_json::from_str(&raw)
//!             .unwrap_or(json!({}));
//!         hostreg::host::send_message(&json!({"ok": true})).await
//!     })
//!     .await
//! }
//! ```
//!
//! Disconnect is normal: when the browser closes stdin the loop returns
//! `Ok(())`.
//!
//! ## Features
//!
//! - `install` (default): the manifest registrar.
//! - `tokio` (default): async `get_message`/`send_message`/[`event_loop`]
//!   helpers. The sync framing functions work without it.

pub mod host;

#[cfg(feature = "install")]
pub mod install;

// -------- Host re-exports --------

#[doc(inline)]
pub use host::{decode_message, encode_message, read_message, write_message};

#[cfg(feature = "tokio")]
#[doc(inline)]
pub use host::{event_loop, get_message, send_message};

// -------- Install re-exports --------

#[cfg(feature = "install")]
#[doc(inline)]
pub use install::{
    install, uninstall, verify_installed, EventSink, HostDescriptor, InstallError, TracingSink,
};
