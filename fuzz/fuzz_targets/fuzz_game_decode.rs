#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(user) = senatus_game::decode_user(data) {
        let _ = user.job_title();
    }
    let _ = senatus_game::decode_game_state(data);
});
