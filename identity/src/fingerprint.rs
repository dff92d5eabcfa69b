//! Keyed identity fingerprint.

use kycgate_crypto::hmac_sha256;
use kycgate_types::{IdentityAttributes, IdentityFingerprint, SecretKey};

use crate::normalize::{normalize_identity, NormalizedIdentity};

/// A fingerprint together with the canonical identity it was computed from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fingerprinted {
    pub fingerprint: IdentityFingerprint,
    pub identity: NormalizedIdentity,
}

/// Computes HMAC-SHA256 fingerprints under a server-only key.
///
/// The key never leaves the server, so a leaked fingerprint cannot be reversed
/// by hashing candidate identities.
#[derive(Clone)]
pub struct FingerprintComputer {
    key: SecretKey,
}

impl FingerprintComputer {
    pub fn new(key: SecretKey) -> Self {
        Self { key }
    }

    /// Fingerprint raw attributes, or `None` when mandatory fields are missing.
    pub fn compute(&self, attrs: &IdentityAttributes) -> Option<Fingerprinted> {
        let identity = normalize_identity(attrs)?;
        Some(Fingerprinted {
            fingerprint: self.fingerprint_of(&identity),
            identity,
        })
    }

    /// Fingerprint an already-normalized identity.
    pub fn fingerprint_of(&self, identity: &NormalizedIdentity) -> IdentityFingerprint {
        let digest = hmac_sha256(self.key.expose(), identity.canonical_string().as_bytes());
        IdentityFingerprint::from_digest(digest)
    }
}

impl std::fmt::Debug for FingerprintComputer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FingerprintComputer").finish_non_exhaustive()
    }
}
