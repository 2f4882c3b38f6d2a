use std::{
    collections::HashMap,
    env,
    path::{Path, PathBuf},
    sync::Mutex,
};

use hostreg::install::{Event, EventSink};
use tempfile::TempDir;

/// Env guard that restores previous env vars on drop.
pub struct EnvGuard {
    old: HashMap<String, Option<String>>,
}

impl EnvGuard {
    pub fn set(vars: &[(&str, String)]) -> Self {
        let mut old = HashMap::new();
        for (k, v) in vars {
            old.insert((*k).to_string(), env::var(k).ok());
            env::set_var(k, v);
        }
        Self { old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (k, prev) in self.old.drain() {
            match prev {
                Some(v) => env::set_var(k, v),
                None => env::remove_var(k),
            }
        }
    }
}

/// Temp sandbox with HOME pointing into it, so tests never touch the real
/// profile. The sandbox home is `<tempdir>/home`.
pub fn sandbox_env() -> (TempDir, EnvGuard) {
    let td = TempDir::new().expect("tempdir");
    let home = td.path().join("home");
    std::fs::create_dir_all(&home).unwrap();
    let guard = EnvGuard::set(&[("HOME", home.to_string_lossy().to_string())]);
    (td, guard)
}

/// The Chrome `NativeMessagingHosts` directory for `home` on this OS.
pub fn chrome_hosts_dir(home: &Path) -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        home.join("Library/Application Support/Google/Chrome/NativeMessagingHosts")
    }
    #[cfg(not(target_os = "macos"))]
    {
        home.join(".config/google-chrome/NativeMessagingHosts")
    }
}

/// Sink that records rendered event lines.
#[derive(Default)]
pub struct RecordingSink(Mutex<Vec<String>>);

impl RecordingSink {
    pub fn lines(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &Event) {
        self.0.lock().unwrap().push(event.to_string());
    }
}
