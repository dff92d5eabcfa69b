//! Machine-readable outcomes of one reconciliation.

use kycgate_types::KycState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed message for suspended accounts.
pub const SUSPENDED_MESSAGE: &str =
    "Your account has been suspended after repeated failed verifications. Please contact support to continue.";

/// Which channel delivered the verdict.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconcileSource {
    Poll,
    Webhook,
}

impl ReconcileSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Poll => "poll",
            Self::Webhook => "webhook",
        }
    }
}

impl fmt::Display for ReconcileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeCode {
    ProviderDeclined,
    VerificationPending,
    FaceMatchLowConfidence,
    DocumentationMismatch,
    DuplicateIdentity,
    AccountSuspended,
}

impl OutcomeCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProviderDeclined => "provider_declined",
            Self::VerificationPending => "verification_pending",
            Self::FaceMatchLowConfidence => "face_match_low_confidence",
            Self::DocumentationMismatch => "documentation_mismatch",
            Self::DuplicateIdentity => "duplicate_identity",
            Self::AccountSuspended => "account_suspended",
        }
    }

    /// What the user should do next.
    pub fn remediation_hint(&self) -> &'static str {
        match self {
            Self::ProviderDeclined => {
                "The verification provider declined your submission. Check that your document is valid and try again."
            }
            Self::VerificationPending => "Your verification is still being reviewed. Check back shortly.",
            Self::FaceMatchLowConfidence => {
                "Your selfie did not clearly match your document photo. Retake it in good light, facing the camera."
            }
            Self::DocumentationMismatch => {
                "We could not read all required details from your document. Upload a clear photo of the full document."
            }
            Self::DuplicateIdentity => {
                "This identity is already verified on another account. Contact support if you believe this is a mistake."
            }
            Self::AccountSuspended => SUSPENDED_MESSAGE,
        }
    }
}

impl fmt::Display for OutcomeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of reconciling one verdict.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReconcileOutcome {
    pub next_state: KycState,
    /// Absent when the account was verified.
    pub code: Option<OutcomeCode>,
    /// Present on rejection and suspension.
    pub remaining_attempts: Option<u32>,
}

impl ReconcileOutcome {
    pub fn verified() -> Self {
        Self {
            next_state: KycState::Verified,
            code: None,
            remaining_attempts: None,
        }
    }

    pub fn pending() -> Self {
        Self {
            next_state: KycState::Pending,
            code: Some(OutcomeCode::VerificationPending),
            remaining_attempts: None,
        }
    }

    pub fn rejected(code: OutcomeCode, remaining_attempts: u32) -> Self {
        Self {
            next_state: KycState::Rejected,
            code: Some(code),
            remaining_attempts: Some(remaining_attempts),
        }
    }

    pub fn suspended() -> Self {
        Self {
            next_state: KycState::Suspended,
            code: Some(OutcomeCode::AccountSuspended),
            remaining_attempts: Some(0),
        }
    }

    /// User-facing message: fixed for suspension, a hint otherwise.
    pub fn message(&self) -> Option<&'static str> {
        match self.next_state {
            KycState::Suspended => Some(SUSPENDED_MESSAGE),
            _ => self.code.map(|c| c.remediation_hint()),
        }
    }
}
