//! Parse and validation errors for the shared types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid account id: {0:?}")]
    InvalidAccountId(String),

    #[error("invalid session reference: {0}")]
    InvalidReference(String),

    #[error("invalid fingerprint: {0}")]
    InvalidFingerprint(String),

    #[error("unknown KYC state: {0}")]
    UnknownState(String),
}
