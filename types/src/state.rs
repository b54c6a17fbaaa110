//! Link lifecycle states.

use serde::{Deserialize, Serialize};

/// Where a chat identity is in the linking lifecycle.
///
/// `Unlinked` has no stored record; the other two are derived from
/// [`LinkedAccount::verified`](crate::LinkedAccount).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkState {
    Unlinked,
    /// Record exists; ownership not yet proven.
    Pending,
    /// Terminal until the link is deleted.
    Verified,
}

impl LinkState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unlinked => "unlinked",
            Self::Pending => "pending",
            Self::Verified => "verified",
        }
    }
}
