//! Linked account and party-role binding records.

use crate::code::VerificationCode;
use crate::ids::{CommunityId, ExternalAccountId, InternalId, PartyId, PlatformUserId, RoleId};
use crate::state::LinkState;
use serde::{Deserialize, Serialize};

/// A chat identity linked (or being linked) to an external game account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedAccount {
    /// Primary key, generated at creation.
    pub internal_id: InternalId,
    /// Unique per record: one chat identity maps to at most one account.
    pub platform_user_id: PlatformUserId,
    /// Not unique across records; admin overrides may duplicate it.
    pub external_account_id: ExternalAccountId,
    pub verified: bool,
    /// Present only while a code is outstanding.
    pub pending_code: Option<VerificationCode>,
}

impl LinkedAccount {
    /// A fresh, unverified record with no code issued.
    pub fn new(
        internal_id: InternalId,
        platform_user_id: PlatformUserId,
        external_account_id: ExternalAccountId,
    ) -> Self {
        Self {
            internal_id,
            platform_user_id,
            external_account_id,
            verified: false,
            pending_code: None,
        }
    }

    pub fn state(&self) -> LinkState {
        if self.verified {
            LinkState::Verified
        } else {
            LinkState::Pending
        }
    }
}

/// Cached mapping from a game party to the chat role created for it in one community.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyRoleBinding {
    pub party_id: PartyId,
    pub community_id: CommunityId,
    pub role_id: RoleId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_account_starts_pending_without_code() {
        let acc = LinkedAccount::new(
            InternalId::new("12345678"),
            PlatformUserId::new("1"),
            ExternalAccountId::new("159"),
        );
        assert!(!acc.verified);
        assert!(acc.pending_code.is_none());
        assert_eq!(acc.state(), LinkState::Pending);
    }
}
