#![no_main]

use libfuzzer_sys::fuzz_target;

// Interaction bodies come from the network; decoding must never panic.
fuzz_target!(|data: &[u8]| {
    let _ = senatus_interactions::parse_interaction(data);
});
