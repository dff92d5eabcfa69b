//! Canonicalization of raw identity attributes.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use kycgate_types::{IdentityAttributes, RawDate};

use crate::country::normalize_country;

/// Substituted when the document number is empty or was not extracted.
///
/// All applicants missing document data who share country, DOB and name collide on
/// this value. That is accepted: it keeps duplicate detection working for them.
pub const NO_DOCUMENT: &str = "NODOC";

/// What the provider sends when it could not read the document number.
const NOT_EXTRACTED_PLACEHOLDER: &str = "0";

/// The five canonical fields that make up a fingerprint, plus the verified
/// display name written back to the account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedIdentity {
    pub country: String,
    pub date_of_birth: String,
    pub given_name: String,
    pub family_name: String,
    pub document_number: String,
    /// Verified name in its original casing, whitespace collapsed.
    pub display_name: String,
}

impl NormalizedIdentity {
    /// Delimited canonical form fed to the keyed hash.
    pub fn canonical_string(&self) -> String {
        [
            self.country.as_str(),
            self.date_of_birth.as_str(),
            self.given_name.as_str(),
            self.family_name.as_str(),
            self.document_number.as_str(),
        ]
        .join("|")
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trim, collapse whitespace, uppercase. `|` is the field delimiter and is dropped.
pub fn normalize_name(raw: &str) -> Option<String> {
    let cleaned: String = raw.chars().filter(|c| *c != '|').collect();
    let name = collapse_whitespace(&cleaned).to_uppercase();
    (!name.is_empty()).then_some(name)
}

/// Split a full name on its last whitespace boundary into (given, family).
/// A single token is used for both.
pub fn split_full_name(raw: &str) -> Option<(String, String)> {
    let full = normalize_name(raw)?;
    match full.rsplit_once(' ') {
        Some((given, family)) => Some((given.to_string(), family.to_string())),
        None => Some((full.clone(), full)),
    }
}

/// Strip non-alphanumerics and uppercase; empty or placeholder becomes [`NO_DOCUMENT`].
pub fn normalize_document_number(raw: Option<&str>) -> String {
    let cleaned: String = raw
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_uppercase)
        .collect();
    if cleaned.is_empty() || cleaned == NOT_EXTRACTED_PLACEHOLDER {
        NO_DOCUMENT.to_string()
    } else {
        cleaned
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn date_from_millis(millis: i64) -> Option<String> {
    DateTime::from_timestamp_millis(millis).map(|dt| format_date(dt.date_naive()))
}

/// Canonicalize a date of birth to `YYYY-MM-DD`.
pub fn normalize_date_of_birth(raw: &RawDate) -> Option<String> {
    match raw {
        RawDate::EpochMillis(ms) => date_from_millis(*ms),
        RawDate::Parts { year, month, day } => NaiveDate::from_ymd_opt(
            i32::try_from(*year).ok()?,
            u32::try_from(*month).ok()?,
            u32::try_from(*day).ok()?,
        )
        .map(format_date),
        RawDate::Text(text) => {
            let s = text.trim();
            if s.len() > 8 && s.bytes().all(|b| b.is_ascii_digit()) {
                return date_from_millis(s.parse().ok()?);
            }
            if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                return Some(format_date(d));
            }
            if let Ok(d) = NaiveDate::parse_from_str(s, "%Y/%m/%d") {
                return Some(format_date(d));
            }
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(format_date(dt.date_naive()));
            }
            for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
                if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                    return Some(format_date(dt.date()));
                }
            }
            None
        }
    }
}

fn display_name(attrs: &IdentityAttributes) -> String {
    match (&attrs.given_name, &attrs.family_name) {
        (Some(g), Some(f)) if !g.trim().is_empty() && !f.trim().is_empty() => {
            collapse_whitespace(&format!("{g} {f}"))
        }
        _ => attrs
            .full_name
            .as_deref()
            .map(collapse_whitespace)
            .unwrap_or_default(),
    }
}

/// Canonicalize all fields. `None` when country, DOB, given or family name is
/// still missing after the full-name fallback.
pub fn normalize_identity(attrs: &IdentityAttributes) -> Option<NormalizedIdentity> {
    let country = attrs.country.as_deref().and_then(normalize_country)?;
    let date_of_birth = attrs.date_of_birth.as_ref().and_then(normalize_date_of_birth)?;

    let given = attrs.given_name.as_deref().and_then(normalize_name);
    let family = attrs.family_name.as_deref().and_then(normalize_name);
    let (given_name, family_name) = match (given, family) {
        (Some(g), Some(f)) => (g, f),
        // Whatever half is missing comes from the full name.
        (given, family) => {
            let (split_given, split_family) =
                attrs.full_name.as_deref().and_then(split_full_name)?;
            (given.unwrap_or(split_given), family.unwrap_or(split_family))
        }
    };

    Some(NormalizedIdentity {
        country,
        date_of_birth,
        given_name,
        family_name,
        document_number: normalize_document_number(attrs.document_number.as_deref()),
        display_name: display_name(attrs),
    })
}
