//! Identity fingerprint: the keyed hash that identifies one person across accounts.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TypesError;

/// A 256-bit keyed hash over normalized identity attributes, stored as lowercase hex.
///
/// The underlying PII cannot be recovered without the server-side key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct IdentityFingerprint(String);

impl IdentityFingerprint {
    /// Length of the hex encoding.
    pub const HEX_LEN: usize = 64;

    /// Wrap a 32-byte digest.
    pub fn from_digest(digest: [u8; 32]) -> Self {
        Self(hex::encode(digest))
    }

    /// Parse a stored hex fingerprint.
    pub fn from_hex(hex: &str) -> Result<Self, TypesError> {
        if hex.len() != Self::HEX_LEN || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(TypesError::InvalidFingerprint(format!(
                "expected {} hex chars, got {:?}",
                Self::HEX_LEN,
                hex
            )));
        }
        Ok(Self(hex.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix for log lines. Never log the full value.
    pub fn short(&self) -> &str {
        &self.0[..8]
    }
}

impl TryFrom<String> for IdentityFingerprint {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(&s)
    }
}

impl fmt::Display for IdentityFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
