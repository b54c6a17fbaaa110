//! Thread-RNG backed code source.

use rand::Rng;
use senatus_types::{CodeSource, InternalId, VerificationCode};

const INTERNAL_ID_MIN: u64 = 10_000_000;
const INTERNAL_ID_MAX: u64 = 99_999_999;

/// Draws codes and 8-digit internal ids from the thread-local RNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomCodeSource;

impl CodeSource for RandomCodeSource {
    fn next_code(&self) -> VerificationCode {
        let n = rand::thread_rng().gen_range(VerificationCode::MIN..=VerificationCode::MAX);
        // in range by construction
        VerificationCode::from_number(n).unwrap_or_else(|_| unreachable!())
    }

    fn next_internal_id(&self) -> InternalId {
        let n = rand::thread_rng().gen_range(INTERNAL_ID_MIN..=INTERNAL_ID_MAX);
        InternalId::new(n.to_string())
    }
}
