//! Abstract storage traits for kycgate.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these traits.
//! The rest of the codebase depends only on the traits.
//!
//! Identity uniqueness is a store concern: at most one verified account may hold
//! a given fingerprint, and [`AccountStore::commit_verification`] must enforce
//! that atomically with the state change.

pub mod account;
pub mod error;
pub mod session;

pub use account::{AccountRecord, AccountStore, RejectionCommit, VerifiedFields};
pub use error::StoreError;
pub use session::SessionStore;
