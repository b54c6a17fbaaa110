//! Nullable random: deterministic verification codes and ids.

use senatus_types::{CodeSource, InternalId, VerificationCode};
use std::sync::Mutex;

/// A deterministic code source for testing.
///
/// Returns pre-configured codes in order (cycling), and sequential internal ids.
pub struct NullRandom {
    codes: Vec<u64>,
    index: Mutex<usize>,
    next_id: Mutex<u64>,
}

impl NullRandom {
    /// Create with a sequence of codes; each must be a 10-digit number.
    pub fn new(codes: Vec<u64>) -> Self {
        assert!(!codes.is_empty(), "NullRandom needs at least one code");
        Self {
            codes,
            index: Mutex::new(0),
            next_id: Mutex::new(10_000_000),
        }
    }

    /// Create with a single code that will be returned for every call.
    pub fn constant(code: u64) -> Self {
        Self::new(vec![code])
    }

    /// How many codes have been handed out.
    pub fn codes_issued(&self) -> usize {
        *self.index.lock().unwrap()
    }
}

impl Default for NullRandom {
    fn default() -> Self {
        Self::new(vec![1_111_111_111, 2_222_222_222, 3_333_333_333])
    }
}

impl CodeSource for NullRandom {
    fn next_code(&self) -> VerificationCode {
        let mut idx = self.index.lock().unwrap();
        let n = self.codes[*idx % self.codes.len()];
        *idx += 1;
        VerificationCode::from_number(n).expect("NullRandom codes must be 10 digits")
    }

    fn next_internal_id(&self) -> InternalId {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        InternalId::new(next.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_cycle_in_order() {
        let r = NullRandom::new(vec![1_000_000_001, 1_000_000_002]);
        assert_eq!(r.next_code().as_str(), "1000000001");
        assert_eq!(r.next_code().as_str(), "1000000002");
        assert_eq!(r.next_code().as_str(), "1000000001");
        assert_eq!(r.codes_issued(), 3);
    }

    #[test]
    fn ids_are_unique() {
        let r = NullRandom::default();
        assert_ne!(r.next_internal_id(), r.next_internal_id());
    }
}
