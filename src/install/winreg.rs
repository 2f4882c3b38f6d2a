use std::io;

use winreg::enums::{HKEY_CURRENT_USER, KEY_ENUMERATE_SUB_KEYS, KEY_QUERY_VALUE};
use winreg::RegKey;

use super::registry::RegistryOps;

/// [`RegistryOps`] backed by HKCU.
///
/// Each call opens its own `RegKey`, so the handle is released when the key
/// drops, on error paths included.
#[derive(Clone, Copy, Debug, Default)]
pub struct WinRegistry;

impl RegistryOps for WinRegistry {
    fn subkey_names(&self, root: &str) -> io::Result<Vec<String>> {
        let hkcu = RegKey::predef(HKEY_CURRENT_USER);
        let key = hkcu.open_subkey_with_flags(root, KEY_QUERY_VALUE | KEY_ENUMERATE_SUB_KEYS)?;
        key.enum_keys().collect()
    }

    fn set_default_value(&self, key_path: &str, value: &str) -> io::Result<()> {
        let hkcu = RegKey::predef(HKEY_CURRENT_USER);
        // create_subkey opens the key when it already exists.
        let (key, _disposition) = hkcu.create_subkey(key_path)?;
        key.set_value("", &value)
    }

    fn delete_key(&self, key_path: &str) -> io::Result<()> {
        let hkcu = RegKey::predef(HKEY_CURRENT_USER);
        hkcu.delete_subkey(key_path)
    }
}
