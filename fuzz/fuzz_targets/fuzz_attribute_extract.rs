#![no_main]

use kycgate_identity::{extract_attributes, extract_face_match_confidence, FingerprintComputer};
use kycgate_types::SecretKey;
use libfuzzer_sys::fuzz_target;

// Arbitrary provider documents must never panic the extractor, the status
// parser or the fingerprint computation.
fuzz_target!(|data: &[u8]| {
    let Ok(doc) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };

    let attrs = extract_attributes(&doc);
    if let Some(confidence) = extract_face_match_confidence(&doc) {
        assert!(confidence <= 100);
    }
    let _ = kycgate_provider::parse_status_document(&doc);

    let computer = FingerprintComputer::new(SecretKey::from("fuzz-key"));
    if let Some(fp) = computer.compute(&attrs) {
        assert_eq!(fp.fingerprint.as_str().len(), 64);
        // Same input, same fingerprint.
        assert_eq!(computer.compute(&attrs).map(|f| f.fingerprint), Some(fp.fingerprint));
    }
});
