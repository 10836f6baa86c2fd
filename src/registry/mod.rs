//! Registry value model and the registry access seam.
//!
//! [`RegistryValue`] is a closed tagged union over the value kinds the engine
//! reconciles, with `Absent` modelling a value (or key) that does not exist.
//! Equality between two observed/declared values is direct equality first,
//! falling back to stringified comparison between two *present* values — a
//! deliberate tolerance for serializer round-trip differences (a `Dword(14)`
//! declaration matches a `String("14")` reading). An absent value never
//! equals a present one.
//!
//! [`RegistryOps`] is the capability trait the reconciler consumes; the
//! production implementation lives in [`windows`] and an in-memory fake for
//! tests lives in [`test_helpers`].

#[cfg(windows)]
pub mod windows;

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A registry value payload, tagged by kind.
///
/// The serde representation is adjacently tagged so declaration files spell
/// values as `{ kind = "dword", data = 14 }`; `{ kind = "none" }` declares
/// absence (delete on apply, or no default on revert).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "kebab-case")]
pub enum RegistryValue {
    /// REG_SZ.
    String(String),
    /// REG_EXPAND_SZ — environment references expanded by consumers.
    ExpandString(String),
    /// REG_DWORD, 32-bit.
    Dword(u32),
    /// REG_QWORD, 64-bit.
    Qword(u64),
    /// REG_BINARY blob.
    Binary(Vec<u8>),
    /// REG_MULTI_SZ list.
    MultiString(Vec<String>),
    /// The value does not exist.
    #[serde(rename = "none")]
    Absent,
}

impl RegistryValue {
    /// Whether this is the absent marker.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Stringified form used for the lenient cross-kind comparison and for
    /// human-readable messages. `None` for [`Self::Absent`].
    #[must_use]
    pub fn render(&self) -> Option<String> {
        match self {
            Self::String(s) | Self::ExpandString(s) => Some(s.clone()),
            Self::Dword(n) => Some(n.to_string()),
            Self::Qword(n) => Some(n.to_string()),
            Self::Binary(bytes) => Some(BASE64.encode(bytes)),
            Self::MultiString(items) => Some(items.join("\n")),
            Self::Absent => None,
        }
    }
}

impl fmt::Display for RegistryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.render() {
            Some(s) => write!(f, "{s}"),
            None => write!(f, "<absent>"),
        }
    }
}

/// Compare two values: direct equality first, then stringified comparison
/// between two present values.
#[must_use]
pub fn values_equal(a: &RegistryValue, b: &RegistryValue) -> bool {
    if a == b {
        return true;
    }
    match (a.render(), b.render()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// Capability trait for reading and mutating named values under a key.
///
/// Key paths use the `HIVE\sub\key` spelling (`HKCU\Console`). Reads report
/// a missing key or value as [`RegistryValue::Absent`]; only genuine access
/// failures surface as errors. Deleting a value that does not exist is a
/// no-op.
pub trait RegistryOps: Send + Sync + fmt::Debug {
    /// Read the named value, or `Absent` when the key or value is missing.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Access`](crate::error::EngineError::Access) on
    /// an access failure (permissions, malformed key path).
    fn get_value(&self, key: &str, name: &str) -> Result<RegistryValue>;

    /// Write the named value with its declared kind.
    ///
    /// # Errors
    ///
    /// Returns an access error on write failure, or when `value` is
    /// [`RegistryValue::Absent`] (absence is applied by deletion, not by
    /// writing).
    fn set_value(&self, key: &str, name: &str, value: &RegistryValue) -> Result<()>;

    /// Delete the named value. Missing values are treated as already deleted.
    ///
    /// # Errors
    ///
    /// Returns an access error when the deletion fails for any reason other
    /// than the value not existing.
    fn delete_value(&self, key: &str, name: &str) -> Result<()>;

    /// List the value names present under `key`.
    ///
    /// # Errors
    ///
    /// Returns an access error when the key cannot be opened. A missing key
    /// yields an empty list.
    fn enumerate_values(&self, key: &str) -> Result<Vec<String>>;
}
