//! Core domain types shared by every netsweep component.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Value stored in `os_name` when a host has no usable OS match.
pub const OS_NOT_DETECTED: &str = "OS not detected";

// ── Prefix ────────────────────────────────────────────────────────

/// A network range tagged for discovery, e.g. `10.0.1.0/24`.
///
/// Opaque to netsweep: it is handed to the scanner verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Prefix(pub String);

impl Prefix {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Prefix {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Prefix {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ── HostRecord ────────────────────────────────────────────────────

/// One host extracted from a scan document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostRecord {
    /// IPv4 literal, e.g. `10.0.0.5`.
    pub address: String,
    /// Subnet tag taken from the document's file name, e.g. `24`.
    pub subnet: String,
    /// Formatted OS match, or [`OS_NOT_DETECTED`].
    pub os_name: String,
    /// Host state reported by the scanner (`up`, `down`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl HostRecord {
    /// Address in the `{address}/{subnet}` form IPAM expects.
    pub fn cidr(&self) -> String {
        format!("{}/{}", self.address, self.subnet)
    }
}

/// Render an OS match as `Os: <name>, Accuracy: <accuracy>`.
pub fn format_os_match(name: &str, accuracy: Option<&str>) -> String {
    format!("Os: {name}, Accuracy: {}", accuracy.unwrap_or("unknown"))
}
