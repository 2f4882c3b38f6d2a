#![cfg(windows)]

use std::{fs, sync::Mutex};

use hostreg::install::registry::RegistryRegistrar;
use hostreg::install::winreg::WinRegistry;
use hostreg::install::{Event, EventSink, Installer, RealFs, Registrar, Uninstaller};
use hostreg::HostDescriptor;
use serial_test::serial;

#[derive(Default)]
struct RecordingSink(Mutex<Vec<String>>);

impl EventSink for RecordingSink {
    fn emit(&self, event: &Event) {
        self.0.lock().unwrap().push(event.to_string());
    }
}

#[test]
#[serial]
fn install_and_uninstall_against_hkcu() {
    let td = tempfile::tempdir().unwrap();
    let exe = td.path().join("hostreg-test.exe");
    fs::write(&exe, b"not really an exe").unwrap();

    let descriptor =
        HostDescriptor::new("com.example.hostreg_itest", &exe).with_description("test host");

    let registrar = RegistryRegistrar::new(WinRegistry, RealFs);
    let targets = registrar.locate_targets(&descriptor).unwrap();
    if targets.is_empty() {
        // No Chrome channel under HKCU\SOFTWARE\Google on this machine;
        // zero targets is a valid state and there is nothing to assert.
        return;
    }

    let sink = RecordingSink::default();
    Installer::new(&registrar, &sink)
        .install(&descriptor)
        .expect("install");

    // Manifest sits beside the executable, one registration per channel.
    let manifest = td.path().join("com.example.hostreg_itest.json");
    assert!(manifest.exists());
    assert_eq!(sink.0.lock().unwrap().len(), targets.len());

    let sink = RecordingSink::default();
    Uninstaller::new(&registrar, &sink).uninstall(&descriptor);
    assert!(!manifest.exists());
    assert!(!exe.exists());
    assert!(sink
        .0
        .lock()
        .unwrap()
        .iter()
        .any(|l| l.starts_with("Removed registry key")));
}
