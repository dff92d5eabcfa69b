#![no_main]

use arbitrary::Arbitrary;
use kycgate_crypto::{check_signature, compute_signature, verify_signature};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    body: &'a [u8],
    secret: &'a [u8],
    header: &'a str,
}

fuzz_target!(|input: Input<'_>| {
    // Arbitrary headers never panic.
    let _ = check_signature(input.body, input.secret, Some(input.header));

    // The real signature always verifies.
    let sig = compute_signature(input.body, input.secret);
    assert!(verify_signature(input.body, input.secret, &sig));

    // Appending a byte to the body breaks it.
    let mut longer = input.body.to_vec();
    longer.push(0);
    assert!(!verify_signature(&longer, input.secret, &sig));
});
