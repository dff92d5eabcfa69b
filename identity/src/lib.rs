//! Identity fingerprinting.
//!
//! Three stages, all pure:
//! 1. [`extract`] pulls raw attributes out of a loosely-shaped provider document,
//!    following a fixed priority list of paths per field.
//! 2. [`normalize`] canonicalizes each field (ISO-2 country, `YYYY-MM-DD` date,
//!    uppercase names, alphanumeric document number).
//! 3. [`FingerprintComputer`] joins the canonical fields and computes an HMAC under
//!    a server-only key.
//!
//! Missing mandatory data yields `None` ("no fingerprint possible"), never an error.

pub mod country;
pub mod extract;
pub mod fingerprint;
pub mod normalize;

pub use extract::{extract_attributes, extract_face_match_confidence};
pub use fingerprint::{FingerprintComputer, Fingerprinted};
pub use normalize::{normalize_identity, NormalizedIdentity, NO_DOCUMENT};
