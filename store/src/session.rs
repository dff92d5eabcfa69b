//! Verification session storage trait.

use crate::StoreError;
use kycgate_types::{AccountId, VerificationSession};

/// Keeps the most recent provider session per account so the poll path knows
/// which reference to query.
pub trait SessionStore: Send + Sync {
    /// Record a new session; it becomes the account's latest.
    fn put_session(&self, session: &VerificationSession) -> Result<(), StoreError>;

    fn latest_session(&self, owner: &AccountId) -> Result<Option<VerificationSession>, StoreError>;
}
