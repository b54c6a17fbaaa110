//! LMDB implementation of PartyRoleStore.
//!
//! Keys are `"{community_id}/{party_id}"` so every binding of one community
//! is reachable with a single prefix scan.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use senatus_store::{PartyRoleStore, StoreError};
use senatus_types::{CommunityId, PartyId, PartyRoleBinding, RoleId};

use crate::LmdbError;

pub struct LmdbPartyRoleStore {
    pub(crate) env: Arc<Env>,
    pub(crate) party_roles_db: Database<Bytes, Bytes>,
}

fn binding_key(party: &PartyId, community: &CommunityId) -> Vec<u8> {
    format!("{community}/{party}").into_bytes()
}

fn community_prefix(community: &CommunityId) -> Vec<u8> {
    format!("{community}/").into_bytes()
}

fn decode_role(bytes: &[u8]) -> Result<RoleId, LmdbError> {
    std::str::from_utf8(bytes)
        .map(RoleId::new)
        .map_err(|e| LmdbError::Serialization(format!("role id is not utf-8: {e}")))
}

impl PartyRoleStore for LmdbPartyRoleStore {
    fn get_party_role(
        &self,
        party: &PartyId,
        community: &CommunityId,
    ) -> Result<Option<RoleId>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .party_roles_db
            .get(&rtxn, &binding_key(party, community))
            .map_err(LmdbError::from)?;
        Ok(val.map(decode_role).transpose()?)
    }

    fn put_party_role(
        &self,
        party: &PartyId,
        community: &CommunityId,
        role: &RoleId,
    ) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.party_roles_db
            .put(
                &mut wtxn,
                &binding_key(party, community),
                role.as_str().as_bytes(),
            )
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn delete_party_role(
        &self,
        party: &PartyId,
        community: &CommunityId,
    ) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.party_roles_db
            .delete(&mut wtxn, &binding_key(party, community))
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn party_roles_in(&self, community: &CommunityId) -> Result<Vec<PartyRoleBinding>, StoreError> {
        let prefix = community_prefix(community);
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self
            .party_roles_db
            .prefix_iter(&rtxn, &prefix)
            .map_err(LmdbError::from)?;
        let mut result = Vec::new();
        for entry in iter {
            let (key, val) = entry.map_err(LmdbError::from)?;
            let party = std::str::from_utf8(&key[prefix.len()..]).map_err(|e| {
                LmdbError::Serialization(format!("party key is not utf-8: {e}"))
            })?;
            result.push(PartyRoleBinding {
                party_id: PartyId::new(party),
                community_id: community.clone(),
                role_id: decode_role(val)?,
            });
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{LmdbEnvironment, DEFAULT_MAP_SIZE};

    fn temp_store() -> (tempfile::TempDir, LmdbPartyRoleStore) {
        let dir = tempfile::tempdir().expect("temp dir");
        let env = LmdbEnvironment::open(dir.path(), DEFAULT_MAP_SIZE).expect("open env");
        (dir, env.party_role_store())
    }

    #[test]
    fn binding_roundtrip_and_overwrite() {
        let (_dir, store) = temp_store();
        let party = PartyId::new("7");
        let guild = CommunityId::new("100");
        assert!(store.get_party_role(&party, &guild).unwrap().is_none());

        store.put_party_role(&party, &guild, &RoleId::new("a")).unwrap();
        store.put_party_role(&party, &guild, &RoleId::new("b")).unwrap();
        assert_eq!(
            store.get_party_role(&party, &guild).unwrap(),
            Some(RoleId::new("b"))
        );

        store.delete_party_role(&party, &guild).unwrap();
        assert!(store.get_party_role(&party, &guild).unwrap().is_none());
    }

    #[test]
    fn bindings_are_scoped_per_community() {
        let (_dir, store) = temp_store();
        let g1 = CommunityId::new("100");
        let g2 = CommunityId::new("1000");
        store.put_party_role(&PartyId::new("1"), &g1, &RoleId::new("r1")).unwrap();
        store.put_party_role(&PartyId::new("2"), &g1, &RoleId::new("r2")).unwrap();
        store.put_party_role(&PartyId::new("1"), &g2, &RoleId::new("r3")).unwrap();

        let mut in_g1 = store.party_roles_in(&g1).unwrap();
        in_g1.sort_by(|a, b| a.party_id.cmp(&b.party_id));
        assert_eq!(in_g1.len(), 2);
        assert_eq!(in_g1[0].role_id, RoleId::new("r1"));
        assert_eq!(in_g1[1].party_id, PartyId::new("2"));
        assert_eq!(store.party_roles_in(&g2).unwrap().len(), 1);
    }
}
