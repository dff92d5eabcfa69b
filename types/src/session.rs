//! Verification sessions and their self-describing references.
//!
//! A reference has the shape `<prefix>-<accountId>-<millis>`. Webhooks carry only
//! the reference, so ownership is recovered by parsing it rather than by looking
//! it up. The prefix never contains `-` and the timestamp is all digits, so the
//! account id is everything between the first and the last `-`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{AccountId, Timestamp, TypesError};

/// An opaque, globally unique session reference that encodes its owner.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionReference {
    raw: String,
    owner: AccountId,
    issued_at_millis: u64,
}

impl SessionReference {
    /// Build a reference for `owner` issued at `issued_at_millis`.
    pub fn generate(
        prefix: &str,
        owner: &AccountId,
        issued_at_millis: u64,
    ) -> Result<Self, TypesError> {
        if prefix.is_empty() || prefix.contains('-') || prefix.chars().any(char::is_whitespace) {
            return Err(TypesError::InvalidReference(format!(
                "prefix {prefix:?} must be non-empty and free of '-'"
            )));
        }
        Ok(Self {
            raw: format!("{prefix}-{owner}-{issued_at_millis}"),
            owner: owner.clone(),
            issued_at_millis,
        })
    }

    /// Parse and validate a reference received from the outside world.
    pub fn parse(raw: &str) -> Result<Self, TypesError> {
        let invalid = || TypesError::InvalidReference(raw.to_string());
        let (prefix, rest) = raw.split_once('-').ok_or_else(invalid)?;
        let (owner, millis) = rest.rsplit_once('-').ok_or_else(invalid)?;
        if prefix.is_empty() || millis.is_empty() || !millis.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let owner = AccountId::new(owner).map_err(|_| invalid())?;
        let issued_at_millis = millis.parse::<u64>().map_err(|_| invalid())?;
        Ok(Self {
            raw: raw.to_string(),
            owner,
            issued_at_millis,
        })
    }

    /// The account that created this session.
    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    /// Issue time in milliseconds since the Unix epoch.
    pub fn issued_at_millis(&self) -> u64 {
        self.issued_at_millis
    }

    pub fn prefix(&self) -> &str {
        self.raw.split_once('-').map(|(p, _)| p).unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for SessionReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl TryFrom<String> for SessionReference {
    type Error = TypesError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<SessionReference> for String {
    fn from(r: SessionReference) -> Self {
        r.raw
    }
}

/// A provider session opened for one account. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationSession {
    pub reference: SessionReference,
    pub owner_account_id: AccountId,
    pub created_at: Timestamp,
}
