//! Raw identity attributes as extracted from a provider document.
//!
//! These are *not* normalized. Normalization and hashing live in `kycgate-identity`;
//! this type only records which value the extractor found for each field.

use serde::{Deserialize, Serialize};

/// A date of birth in whichever shape the provider sent it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawDate {
    /// Milliseconds since the Unix epoch (UTC).
    EpochMillis(i64),
    /// Textual date, e.g. `1990-05-17` or `1990-05-17T00:00:00Z`.
    Text(String),
    /// A nested `{ year, month, day }` object.
    Parts { year: i64, month: i64, day: i64 },
}

/// The identity attributes reported for one verification attempt.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityAttributes {
    pub country: Option<String>,
    pub date_of_birth: Option<RawDate>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    /// Combined name, used only when given/family are absent.
    pub full_name: Option<String>,
    pub document_number: Option<String>,
}
