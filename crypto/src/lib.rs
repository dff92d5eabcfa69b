//! Cryptographic primitives for kycgate.
//!
//! - **SHA-256** for the provider's double-hash signature scheme
//! - **HMAC-SHA256** for keyed identity fingerprints
//! - Constant-time comparison for every secret-dependent equality check

pub mod hash;
pub mod mac;
pub mod signature;

pub use hash::{sha256, sha256_hex, sha256_multi};
pub use mac::hmac_sha256;
pub use signature::{check_signature, compute_signature, verify_signature, SignatureCheck};
