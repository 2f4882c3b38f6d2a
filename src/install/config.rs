use once_cell::sync::Lazy;
use serde::Deserialize;

/// Discovery-location configuration for one browser vendor, loaded from the
/// embedded `vendors.toml`.
#[derive(Deserialize, Debug)]
pub struct Vendor {
    /// Registry key under HKCU whose subkeys are installed browser channels.
    pub registry_root: String,
    /// Case-sensitive prefix a channel subkey must carry to be managed.
    pub channel_prefix: String,
    /// Home-relative glob for manifest directories on macOS.
    pub darwin_glob: String,
    /// Home-relative glob for manifest directories on Linux.
    pub linux_glob: String,
}

#[derive(Deserialize, Debug)]
struct VendorFile {
    chrome: Vendor,
}

static VENDORS: Lazy<VendorFile> =
    Lazy::new(|| toml::from_str(include_str!("vendors.toml")).expect("embedded vendors.toml"));

/// The Chrome entry of the embedded vendor configuration.
pub fn chrome() -> &'static Vendor {
    &VENDORS.chrome
}

impl Vendor {
    /// Home-relative manifest-directory glob for the running OS.
    pub fn dir_glob(&self) -> &str {
        if cfg!(target_os = "macos") {
            &self.darwin_glob
        } else {
            &self.linux_glob
        }
    }
}
