//! Provider status document → [`VerificationResult`].

use kycgate_identity::{extract_attributes, extract_face_match_confidence};
use kycgate_types::{VerificationEvent, VerificationResult};
use serde_json::Value;

use crate::ProviderError;

/// Map the provider's event name onto the three verdicts the reconciler knows.
///
/// Only an explicit accept or decline is final; every other event, including
/// cancellations and timeouts, leaves the account pending.
pub fn map_event(event: &str) -> VerificationEvent {
    match event {
        "verification.accepted" => VerificationEvent::Accepted,
        "verification.declined" => VerificationEvent::Declined,
        _ => VerificationEvent::Pending,
    }
}

/// Parse a status document.
///
/// A missing face-match confidence is reported as 0 so that an accepted verdict
/// without one fails the threshold check.
pub fn parse_status_document(doc: &Value) -> Result<VerificationResult, ProviderError> {
    let provider_event = doc
        .get("event")
        .and_then(Value::as_str)
        .ok_or_else(|| ProviderError::ResponseUnparseable("status has no event".into()))?;

    let event = map_event(provider_event);
    if event == VerificationEvent::Pending {
        return Ok(VerificationResult::pending(provider_event));
    }

    Ok(VerificationResult {
        event,
        face_match_confidence: extract_face_match_confidence(doc).unwrap_or(0),
        attributes: extract_attributes(doc),
        declined_reason: doc
            .get("declined_reason")
            .and_then(Value::as_str)
            .map(str::to_owned),
        provider_event: provider_event.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_mapping() {
        assert_eq!(map_event("verification.accepted"), VerificationEvent::Accepted);
        assert_eq!(map_event("verification.declined"), VerificationEvent::Declined);
        for other in ["request.pending", "request.received", "verification.cancelled", "request.timeout", ""] {
            assert_eq!(map_event(other), VerificationEvent::Pending, "{other}");
        }
    }

    #[test]
    fn accepted_document_carries_attributes() {
        let doc = json!({
            "reference": "kyc-a-1",
            "event": "verification.accepted",
            "verification_data": {
                "document": {
                    "country": "NG",
                    "dob": "1990-05-17",
                    "name": { "first_name": "Ada", "last_name": "Obi" },
                    "document_number": "A123"
                },
                "face": { "face_match_confidence": 91.6 }
            }
        });
        let r = parse_status_document(&doc).unwrap();
        assert_eq!(r.event, VerificationEvent::Accepted);
        assert_eq!(r.face_match_confidence, 92);
        assert_eq!(r.attributes.given_name.as_deref(), Some("Ada"));
        assert_eq!(r.attributes.document_number.as_deref(), Some("A123"));
    }

    #[test]
    fn accepted_without_confidence_is_zero() {
        let r = parse_status_document(&json!({ "event": "verification.accepted" })).unwrap();
        assert_eq!(r.face_match_confidence, 0);
    }

    #[test]
    fn declined_keeps_reason() {
        let r = parse_status_document(&json!({
            "event": "verification.declined",
            "declined_reason": "Document expired"
        }))
        .unwrap();
        assert_eq!(r.event, VerificationEvent::Declined);
        assert_eq!(r.declined_reason.as_deref(), Some("Document expired"));
    }

    #[test]
    fn pending_drops_payload() {
        let r = parse_status_document(&json!({
            "event": "request.pending",
            "verification_data": { "document": { "country": "NG" } }
        }))
        .unwrap();
        assert_eq!(r.event, VerificationEvent::Pending);
        assert_eq!(r.provider_event, "request.pending");
        assert!(r.attributes.country.is_none());
    }

    #[test]
    fn missing_event_is_unparseable() {
        assert!(matches!(
            parse_status_document(&json!({ "reference": "kyc-a-1" })),
            Err(ProviderError::ResponseUnparseable(_))
        ));
    }
}
