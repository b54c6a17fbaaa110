//! Account linking and ownership verification.
//!
//! A chat identity moves through three states:
//! 1. **Unlinked**: no record.
//! 2. **Pending**: a record bound to a game account, possibly holding a one-time code.
//! 3. **Verified**: the code was found in the game account's biography, or an
//!    administrator forced the link.
//!
//! Only the most recently issued code is valid. There is no way back from
//! verified to pending short of deleting the link.

pub mod admins;
pub mod codes;
pub mod engine;
pub mod error;
pub mod locks;
pub mod outcome;

pub use admins::AdminSet;
pub use codes::RandomCodeSource;
pub use engine::VerificationEngine;
pub use error::VerificationError;
pub use locks::IdentityLocks;
pub use outcome::{AccountStatus, ForceVerifyOutcome, UnlinkOutcome, VerifyOutcome};
