//! KYC state of an account.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TypesError;

/// The canonical identity-verification state of an account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KycState {
    /// Account exists but has never completed a provider round-trip.
    NotStarted,
    /// The provider has not reached a verdict yet.
    Pending,
    /// Identity confirmed; the account holds a unique fingerprint.
    Verified,
    /// Last attempt was rejected. The user may try again.
    Rejected,
    /// Too many rejected attempts. Only manual support can lift this.
    Suspended,
}

impl KycState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
            Self::Suspended => "suspended",
        }
    }

    /// Whether a provider verdict for the current session is still owed.
    ///
    /// Verified and suspended are final; a rejected account has already had
    /// its session concluded and waits for a new one.
    pub fn awaits_verdict(&self) -> bool {
        matches!(self, Self::NotStarted | Self::Pending)
    }

    /// Whether the account may open a new provider session.
    pub fn allows_new_attempt(&self) -> bool {
        matches!(self, Self::NotStarted | Self::Pending | Self::Rejected)
    }
}

impl Default for KycState {
    fn default() -> Self {
        Self::NotStarted
    }
}

impl fmt::Display for KycState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for KycState {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(Self::NotStarted),
            "pending" => Ok(Self::Pending),
            "verified" => Ok(Self::Verified),
            "rejected" => Ok(Self::Rejected),
            "suspended" => Ok(Self::Suspended),
            other => Err(TypesError::UnknownState(other.to_string())),
        }
    }
}
