//! Provider signature scheme: `hex(SHA256(body ++ hex(SHA256(secret))))`.
//!
//! This is a fixed compatibility contract with the verification provider. It is
//! used both for inbound webhooks and for the provider's synchronous responses.
//! The body must be the raw bytes as received; re-serializing parsed JSON can
//! reorder keys and break the match.

use subtle::ConstantTimeEq;

use crate::hash::{sha256_hex, sha256_multi};

/// Result of checking a signature header against a body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureCheck {
    Valid,
    Invalid,
    /// No signature was supplied at all.
    Missing,
}

impl SignatureCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Compute the expected signature for `body` under `secret`, as lowercase hex.
pub fn compute_signature(body: &[u8], secret: &[u8]) -> String {
    let secret_digest = sha256_hex(secret);
    hex::encode(sha256_multi(&[body, secret_digest.as_bytes()]))
}

/// Constant-time check of `provided` (hex, any case, surrounding whitespace ignored).
pub fn verify_signature(body: &[u8], secret: &[u8], provided: &str) -> bool {
    let expected = compute_signature(body, secret);
    let provided = provided.trim().to_ascii_lowercase();
    if provided.len() != expected.len() {
        return false;
    }
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}

/// Check an optional signature header.
pub fn check_signature(body: &[u8], secret: &[u8], provided: Option<&str>) -> SignatureCheck {
    match provided {
        None => SignatureCheck::Missing,
        Some(s) if s.trim().is_empty() => SignatureCheck::Missing,
        Some(s) if verify_signature(body, secret, s) => SignatureCheck::Valid,
        Some(_) => SignatureCheck::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha256;
    use proptest::prelude::*;

    const SECRET: &[u8] = b"shared-webhook-secret";
    const BODY: &[u8] = br#"{"reference":"kyc-acc1-1700000000000","event":"verification.accepted"}"#;

    #[test]
    fn matches_definition() {
        let inner = hex::encode(sha256(SECRET));
        let mut concat = BODY.to_vec();
        concat.extend_from_slice(inner.as_bytes());
        assert_eq!(compute_signature(BODY, SECRET), hex::encode(sha256(&concat)));
    }

    #[test]
    fn valid_signature_accepted_in_any_case() {
        let sig = compute_signature(BODY, SECRET);
        assert!(verify_signature(BODY, SECRET, &sig));
        assert!(verify_signature(BODY, SECRET, &sig.to_uppercase()));
        assert!(verify_signature(BODY, SECRET, &format!(" {sig}\n")));
    }

    #[test]
    fn wrong_secret_rejected() {
        let sig = compute_signature(BODY, b"other-secret");
        assert!(!verify_signature(BODY, SECRET, &sig));
    }

    #[test]
    fn reserialized_body_rejected() {
        let sig = compute_signature(BODY, SECRET);
        let reordered = br#"{"event":"verification.accepted","reference":"kyc-acc1-1700000000000"}"#;
        assert!(!verify_signature(reordered, SECRET, &sig));
    }

    #[test]
    fn plain_sha_of_body_rejected() {
        let naive = hex::encode(sha256(BODY));
        assert!(!verify_signature(BODY, SECRET, &naive));
    }

    #[test]
    fn check_reports_missing() {
        assert_eq!(check_signature(BODY, SECRET, None), SignatureCheck::Missing);
        assert_eq!(check_signature(BODY, SECRET, Some("  ")), SignatureCheck::Missing);
        assert_eq!(check_signature(BODY, SECRET, Some("00")), SignatureCheck::Invalid);
        let sig = compute_signature(BODY, SECRET);
        assert!(check_signature(BODY, SECRET, Some(&sig)).is_valid());
    }

    proptest! {
        /// Flipping any single byte of the body invalidates the signature.
        #[test]
        fn single_byte_mutation_invalidates(
            body in prop::collection::vec(any::<u8>(), 1..256),
            idx in any::<prop::sample::Index>(),
            flip in 1u8..=255,
        ) {
            let sig = compute_signature(&body, SECRET);
            prop_assert!(verify_signature(&body, SECRET, &sig));
            let mut mutated = body.clone();
            let i = idx.index(mutated.len());
            mutated[i] ^= flip;
            prop_assert!(!verify_signature(&mutated, SECRET, &sig));
        }

        /// Arbitrary header text never panics and only the real signature passes.
        #[test]
        fn arbitrary_header_text(header in ".{0,80}") {
            let expected = compute_signature(BODY, SECRET);
            let ok = verify_signature(BODY, SECRET, &header);
            prop_assert_eq!(ok, header.trim().eq_ignore_ascii_case(&expected));
        }
    }
}
