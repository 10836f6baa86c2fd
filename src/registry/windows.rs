//! Production [`RegistryOps`] backed by the Windows registry via `winreg`.

use std::io;

use winreg::enums::{
    HKEY_CLASSES_ROOT, HKEY_CURRENT_CONFIG, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, HKEY_USERS,
    KEY_READ, RegType,
};
use winreg::{HKEY, RegKey, RegValue};

use super::{RegistryOps, RegistryValue};
use crate::error::{EngineError, Result};

/// [`RegistryOps`] implementation over the live Windows registry.
#[derive(Debug, Default)]
pub struct WindowsRegistry;

impl WindowsRegistry {
    /// Create the production registry capability.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl RegistryOps for WindowsRegistry {
    fn get_value(&self, key: &str, name: &str) -> Result<RegistryValue> {
        let (hive, path) = split_key_path(key)?;
        let subkey = match RegKey::predef(hive).open_subkey_with_flags(path, KEY_READ) {
            Ok(k) => k,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(RegistryValue::Absent),
            Err(e) => return Err(access(key, name, &e)),
        };
        match subkey.get_raw_value(name) {
            Ok(raw) => Ok(decode_value(&raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(RegistryValue::Absent),
            Err(e) => Err(access(key, name, &e)),
        }
    }

    fn set_value(&self, key: &str, name: &str, value: &RegistryValue) -> Result<()> {
        let raw = encode_value(value).ok_or_else(|| {
            EngineError::Access("cannot write an absent value".to_string())
        })?;
        let (hive, path) = split_key_path(key)?;
        let (subkey, _) = RegKey::predef(hive)
            .create_subkey(path)
            .map_err(|e| access(key, name, &e))?;
        subkey
            .set_raw_value(name, &raw)
            .map_err(|e| access(key, name, &e))
    }

    fn delete_value(&self, key: &str, name: &str) -> Result<()> {
        let (hive, path) = split_key_path(key)?;
        let subkey = match RegKey::predef(hive).open_subkey_with_flags(path, winreg::enums::KEY_ALL_ACCESS)
        {
            Ok(k) => k,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(access(key, name, &e)),
        };
        match subkey.delete_value(name) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(access(key, name, &e)),
        }
    }

    fn enumerate_values(&self, key: &str) -> Result<Vec<String>> {
        let (hive, path) = split_key_path(key)?;
        let subkey = match RegKey::predef(hive).open_subkey_with_flags(path, KEY_READ) {
            Ok(k) => k,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(access(key, "*", &e)),
        };
        let mut names = Vec::new();
        for item in subkey.enum_values() {
            let (name, _) = item.map_err(|e| access(key, "*", &e))?;
            names.push(name);
        }
        Ok(names)
    }
}

fn access(key: &str, name: &str, e: &io::Error) -> EngineError {
    EngineError::Access(format!("{key}\\{name}: {e}"))
}

/// Split `HIVE\sub\key` into a predefined hive handle and subkey path.
fn split_key_path(key: &str) -> Result<(HKEY, &str)> {
    let (hive, rest) = key.split_once('\\').unwrap_or((key, ""));
    let handle = match hive {
        "HKCU" | "HKEY_CURRENT_USER" => HKEY_CURRENT_USER,
        "HKLM" | "HKEY_LOCAL_MACHINE" => HKEY_LOCAL_MACHINE,
        "HKU" | "HKEY_USERS" => HKEY_USERS,
        "HKCR" | "HKEY_CLASSES_ROOT" => HKEY_CLASSES_ROOT,
        "HKCC" | "HKEY_CURRENT_CONFIG" => HKEY_CURRENT_CONFIG,
        other => {
            return Err(EngineError::Access(format!(
                "unknown registry hive: {other}"
            )));
        }
    };
    Ok((handle, rest))
}

fn decode_value(raw: &RegValue) -> RegistryValue {
    match raw.vtype {
        RegType::REG_SZ => RegistryValue::String(decode_utf16(&raw.bytes)),
        RegType::REG_EXPAND_SZ => RegistryValue::ExpandString(decode_utf16(&raw.bytes)),
        RegType::REG_DWORD => {
            let mut buf = [0u8; 4];
            for (slot, byte) in buf.iter_mut().zip(raw.bytes.iter()) {
                *slot = *byte;
            }
            RegistryValue::Dword(u32::from_le_bytes(buf))
        }
        RegType::REG_QWORD => {
            let mut buf = [0u8; 8];
            for (slot, byte) in buf.iter_mut().zip(raw.bytes.iter()) {
                *slot = *byte;
            }
            RegistryValue::Qword(u64::from_le_bytes(buf))
        }
        RegType::REG_MULTI_SZ => {
            let joined = decode_utf16(&raw.bytes);
            let items = joined
                .split('\0')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            RegistryValue::MultiString(items)
        }
        // Unknown kinds degrade to an opaque blob rather than failing reads.
        _ => RegistryValue::Binary(raw.bytes.clone()),
    }
}

fn encode_value(value: &RegistryValue) -> Option<RegValue> {
    let (bytes, vtype) = match value {
        RegistryValue::String(s) => (encode_utf16(s), RegType::REG_SZ),
        RegistryValue::ExpandString(s) => (encode_utf16(s), RegType::REG_EXPAND_SZ),
        RegistryValue::Dword(n) => (n.to_le_bytes().to_vec(), RegType::REG_DWORD),
        RegistryValue::Qword(n) => (n.to_le_bytes().to_vec(), RegType::REG_QWORD),
        RegistryValue::Binary(b) => (b.clone(), RegType::REG_BINARY),
        RegistryValue::MultiString(items) => {
            let mut bytes = Vec::new();
            for item in items {
                bytes.extend(encode_utf16(item));
            }
            bytes.extend([0u8, 0u8]);
            (bytes, RegType::REG_MULTI_SZ)
        }
        RegistryValue::Absent => return None,
    };
    Some(RegValue { bytes, vtype })
}

/// Decode NUL-terminated UTF-16LE registry bytes, trimming the terminator.
fn decode_utf16(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes(pair.try_into().unwrap_or([0, 0])))
        .collect();
    let end = units.iter().rposition(|&u| u != 0).map_or(0, |i| i + 1);
    String::from_utf16_lossy(units.get(..end).unwrap_or(&[]))
}

/// Encode a string as NUL-terminated UTF-16LE bytes.
fn encode_utf16(s: &str) -> Vec<u8> {
    s.encode_utf16()
        .chain(std::iter::once(0))
        .flat_map(u16::to_le_bytes)
        .collect()
}
