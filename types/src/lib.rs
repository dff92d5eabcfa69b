//! Fundamental types for kycgate.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! account ids, KYC states, identity fingerprints, verification sessions and results,
//! policy parameters, and timestamps.

pub mod account;
pub mod attributes;
pub mod error;
pub mod fingerprint;
pub mod keys;
pub mod params;
pub mod result;
pub mod session;
pub mod state;
pub mod time;

pub use account::AccountId;
pub use attributes::{IdentityAttributes, RawDate};
pub use error::TypesError;
pub use fingerprint::IdentityFingerprint;
pub use keys::SecretKey;
pub use params::KycParams;
pub use result::{VerificationEvent, VerificationResult};
pub use session::{SessionReference, VerificationSession};
pub use state::KycState;
pub use time::{Clock, SystemClock, Timestamp};
