//! Party-role binding storage trait.

use crate::StoreError;
use senatus_types::{CommunityId, PartyId, PartyRoleBinding, RoleId};

/// Per-community cache of which chat role represents which game party.
pub trait PartyRoleStore: Send + Sync {
    fn get_party_role(
        &self,
        party: &PartyId,
        community: &CommunityId,
    ) -> Result<Option<RoleId>, StoreError>;

    /// Insert or replace the binding for `(party, community)`.
    fn put_party_role(
        &self,
        party: &PartyId,
        community: &CommunityId,
        role: &RoleId,
    ) -> Result<(), StoreError>;

    fn delete_party_role(&self, party: &PartyId, community: &CommunityId)
        -> Result<(), StoreError>;

    /// All bindings in one community, in no particular order.
    fn party_roles_in(&self, community: &CommunityId) -> Result<Vec<PartyRoleBinding>, StoreError>;
}
