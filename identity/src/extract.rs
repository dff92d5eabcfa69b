//! Tagged extraction of identity attributes from a provider status document.
//!
//! The provider does not place fields consistently: the same value can appear
//! under the document block, under the proof block, or at the top level,
//! depending on the verification flow. Each field therefore has a priority list
//! of paths, and the first present, non-empty value wins.

use kycgate_types::{IdentityAttributes, RawDate};
use serde_json::Value;

type Path = &'static [&'static str];

pub const COUNTRY_PATHS: &[Path] = &[
    &["verification_data", "document", "country"],
    &["additional_data", "document", "proof", "country"],
    &["verification_data", "address", "country"],
    &["country"],
];

pub const DOB_PATHS: &[Path] = &[
    &["verification_data", "document", "dob"],
    &["additional_data", "document", "proof", "dob"],
    &["verification_data", "document", "date_of_birth"],
    &["dob"],
];

pub const GIVEN_NAME_PATHS: &[Path] = &[
    &["verification_data", "document", "name", "first_name"],
    &["additional_data", "document", "proof", "first_name"],
    &["verification_data", "document", "first_name"],
];

pub const FAMILY_NAME_PATHS: &[Path] = &[
    &["verification_data", "document", "name", "last_name"],
    &["additional_data", "document", "proof", "last_name"],
    &["verification_data", "document", "last_name"],
];

pub const FULL_NAME_PATHS: &[Path] = &[
    &["verification_data", "document", "name", "full_name"],
    &["additional_data", "document", "proof", "full_name"],
    &["verification_data", "document", "full_name"],
];

pub const DOCUMENT_NUMBER_PATHS: &[Path] = &[
    &["verification_data", "document", "document_number"],
    &["additional_data", "document", "proof", "document_number"],
];

pub const FACE_MATCH_PATHS: &[Path] = &[
    &["verification_data", "face", "face_match_confidence"],
    &["verification_result", "face_match_confidence"],
    &["additional_data", "face", "confidence"],
];

/// What kind of JSON value a path resolved to.
#[derive(Debug)]
enum Tagged<'a> {
    Text(&'a str),
    Number(&'a serde_json::Number),
    Object(&'a serde_json::Map<String, Value>),
}

fn lookup<'a>(doc: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(doc, |node, key| node.get(key))
}

fn tag(value: &Value) -> Option<Tagged<'_>> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(Tagged::Text(s)),
        Value::Number(n) => Some(Tagged::Number(n)),
        Value::Object(m) if !m.is_empty() => Some(Tagged::Object(m)),
        _ => None,
    }
}

/// First path whose value is present and non-empty, with its tag.
fn first_present<'a>(doc: &'a Value, paths: &[Path]) -> Option<Tagged<'a>> {
    paths
        .iter()
        .filter_map(|p| lookup(doc, p))
        .find_map(tag)
}

/// First path holding something that reads as text. Numbers count (document
/// numbers are sometimes sent as JSON numbers).
fn first_text(doc: &Value, paths: &[Path]) -> Option<String> {
    paths
        .iter()
        .filter_map(|p| lookup(doc, p))
        .find_map(|v| match tag(v)? {
            Tagged::Text(s) => Some(s.to_string()),
            Tagged::Number(n) => Some(n.to_string()),
            Tagged::Object(_) => None,
        })
}

fn integer_of(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn date_of(tagged: Tagged<'_>) -> Option<RawDate> {
    match tagged {
        Tagged::Number(n) => n.as_i64().map(RawDate::EpochMillis),
        Tagged::Text(s) => {
            let s = s.trim();
            // All-digit strings long enough to be a timestamp are epoch millis.
            if s.len() > 8 && s.bytes().all(|b| b.is_ascii_digit()) {
                s.parse().ok().map(RawDate::EpochMillis)
            } else {
                Some(RawDate::Text(s.to_string()))
            }
        }
        Tagged::Object(m) => Some(RawDate::Parts {
            year: integer_of(m.get("year")?)?,
            month: integer_of(m.get("month")?)?,
            day: integer_of(m.get("day")?)?,
        }),
    }
}

/// Pull every identity attribute out of `doc`, leaving absent fields as `None`.
pub fn extract_attributes(doc: &Value) -> IdentityAttributes {
    IdentityAttributes {
        country: first_text(doc, COUNTRY_PATHS),
        date_of_birth: first_present(doc, DOB_PATHS).and_then(date_of),
        given_name: first_text(doc, GIVEN_NAME_PATHS),
        family_name: first_text(doc, FAMILY_NAME_PATHS),
        full_name: first_text(doc, FULL_NAME_PATHS),
        document_number: first_text(doc, DOCUMENT_NUMBER_PATHS),
    }
}

/// Face-match confidence clamped to 0..=100. Accepts numbers or numeric strings.
pub fn extract_face_match_confidence(doc: &Value) -> Option<u8> {
    FACE_MATCH_PATHS
        .iter()
        .filter_map(|p| lookup(doc, p))
        .find_map(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
        .filter(|f| f.is_finite())
        .map(|f| f.round().clamp(0.0, 100.0) as u8)
}
