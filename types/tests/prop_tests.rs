use proptest::prelude::*;

use kycgate_types::{AccountId, IdentityFingerprint, KycParams, SessionReference};

proptest! {
    /// Any valid account id survives being embedded in a reference.
    #[test]
    fn reference_owner_roundtrip(
        owner in "[A-Za-z0-9_][A-Za-z0-9_-]{0,40}",
        millis in 0u64..=u64::MAX / 2,
    ) {
        let id = AccountId::new(owner.clone()).unwrap();
        let r = SessionReference::generate("kyc", &id, millis).unwrap();
        let parsed = SessionReference::parse(r.as_str()).unwrap();
        prop_assert_eq!(parsed.owner().as_str(), owner.as_str());
        prop_assert_eq!(parsed.issued_at_millis(), millis);
    }

    /// Parsing arbitrary text never panics.
    #[test]
    fn reference_parse_total(raw in ".{0,80}") {
        let _ = SessionReference::parse(&raw);
    }

    /// Fingerprint hex encoding is always 64 lowercase hex chars and re-parses.
    #[test]
    fn fingerprint_hex_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let fp = IdentityFingerprint::from_digest(bytes);
        prop_assert_eq!(fp.as_str().len(), 64);
        let back = IdentityFingerprint::from_hex(fp.as_str()).unwrap();
        prop_assert_eq!(back, fp);
    }

    /// Stored records round-trip through bincode (LMDB value encoding).
    #[test]
    fn reference_bincode_roundtrip(millis in any::<u64>()) {
        let id = AccountId::new("acc-1").unwrap();
        let r = SessionReference::generate("kyc", &id, millis).unwrap();
        let encoded = bincode::serialize(&r).unwrap();
        let decoded: SessionReference = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, r);
    }

    /// Remaining attempts never exceed the maximum and hit zero at suspension.
    #[test]
    fn remaining_attempts_bounded(count in 0u32..20) {
        let p = KycParams::default();
        let left = p.remaining_attempts(count);
        prop_assert!(left <= p.max_rejections);
        prop_assert_eq!(left == 0, count >= p.max_rejections);
    }
}
