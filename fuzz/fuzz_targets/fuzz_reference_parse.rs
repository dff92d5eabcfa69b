#![no_main]

use kycgate_types::SessionReference;
use libfuzzer_sys::fuzz_target;

// Parsing never panics, and any accepted reference reproduces itself when
// regenerated from its parts.
fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(reference) = SessionReference::parse(raw) else {
        return;
    };
    assert_eq!(reference.as_str(), raw);

    if let Ok(regenerated) = SessionReference::generate(
        reference.prefix(),
        reference.owner(),
        reference.issued_at_millis(),
    ) {
        assert_eq!(regenerated.owner(), reference.owner());
        assert_eq!(regenerated.issued_at_millis(), reference.issued_at_millis());
    }
});
