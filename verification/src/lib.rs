//! Verification reconciliation.
//!
//! Two independent channels report verdicts for the same session: the user's
//! status poll and the provider's webhook. Both end up here, in one shared
//! [`VerificationReconciler`], which decides the next KYC state and commits it.
//!
//! Decision order for an accepted verdict:
//! 1. **Face match** below threshold is a rejection.
//! 2. **Fingerprint** that cannot be computed is a rejection.
//! 3. **Duplicate** identity held by another verified account is a rejection.
//! 4. **Commit**, where the store's uniqueness check has the final word.
//!
//! Every rejection increments the account's rejection count; enough of them
//! suspend the account for good.

pub mod error;
pub mod outcome;
pub mod reconciler;
pub mod reward;

pub use error::VerificationError;
pub use outcome::{OutcomeCode, ReconcileOutcome, ReconcileSource, SUSPENDED_MESSAGE};
pub use reconciler::VerificationReconciler;
pub use reward::{QueuedRewardTrigger, ReferralGrant, RewardTrigger, RewardWorker};
