//! Verification codes and the source that mints them.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A one-time code the user pastes into their game biography.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerificationCode(String);

impl VerificationCode {
    /// Number of decimal digits in every issued code.
    pub const DIGITS: usize = 10;
    pub const MIN: u64 = 1_000_000_000;
    pub const MAX: u64 = 9_999_999_999;

    /// Build a code from a number in `MIN..=MAX`.
    pub fn from_number(n: u64) -> Result<Self, TypesError> {
        if !(Self::MIN..=Self::MAX).contains(&n) {
            return Err(TypesError::InvalidCode(n.to_string()));
        }
        Ok(Self(n.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Literal substring match against a free-text biography.
    pub fn appears_in(&self, bio: &str) -> bool {
        bio.contains(self.0.as_str())
    }
}

impl fmt::Display for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of fresh verification codes and internal ids.
///
/// Production uses the OS-seeded RNG; tests plug in a deterministic sequence.
pub trait CodeSource: Send + Sync {
    /// A new code. Consecutive calls may repeat; callers that need a
    /// different code must check.
    fn next_code(&self) -> VerificationCode;

    /// A new random numeric internal id.
    fn next_internal_id(&self) -> crate::InternalId;
}
