#![no_main]

use libfuzzer_sys::fuzz_target;

use senatus_types::VerificationCode;

// Arbitrary bios against an arbitrary code: matching must never panic and
// a bio that embeds the code verbatim must always match.
fuzz_target!(|data: &[u8]| {
    if data.len() < 8 {
        return;
    }
    let n = u64::from_le_bytes([
        data[0], data[1], data[2], data[3],
        data[4], data[5], data[6], data[7],
    ]);
    let Ok(code) = VerificationCode::from_number(n % 10_000_000_000) else {
        return;
    };
    let bio = String::from_utf8_lossy(&data[8..]);
    let _ = code.appears_in(&bio);
    let embedded = format!("{bio}{}", code.as_str());
    assert!(code.appears_in(&embedded));
});
