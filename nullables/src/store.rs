//! Nullable store: thread-safe in-memory storage for testing.

use senatus_store::{AccountStore, PartyRoleStore, StoreError};
use senatus_types::{
    CommunityId, InternalId, LinkedAccount, PartyId, PartyRoleBinding, PlatformUserId, RoleId,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

/// An in-memory account + party-role store for testing.
///
/// Counts successful mutations so tests can assert that an operation wrote
/// nothing, and can be switched into a failing mode to exercise persistence
/// errors.
pub struct NullStore {
    accounts: Mutex<HashMap<InternalId, LinkedAccount>>,
    party_roles: Mutex<HashMap<(CommunityId, PartyId), RoleId>>,
    mutations: AtomicU64,
    fail_writes: AtomicBool,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            party_roles: Mutex::new(HashMap::new()),
            mutations: AtomicU64::new(0),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Number of successful writes and deletes so far.
    pub fn mutation_count(&self) -> u64 {
        self.mutations.load(Ordering::SeqCst)
    }

    /// Make every subsequent write fail with a backend error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("null store is read-only".into()));
        }
        Ok(())
    }

    fn record_mutation(&self) {
        self.mutations.fetch_add(1, Ordering::SeqCst);
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountStore for NullStore {
    fn get_account(&self, id: &InternalId) -> Result<Option<LinkedAccount>, StoreError> {
        Ok(self.accounts.lock().unwrap().get(id).cloned())
    }

    fn get_account_by_platform(
        &self,
        platform_user: &PlatformUserId,
    ) -> Result<Option<LinkedAccount>, StoreError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .values()
            .find(|a| &a.platform_user_id == platform_user)
            .cloned())
    }

    fn put_account(&self, account: &LinkedAccount) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut accounts = self.accounts.lock().unwrap();
        let clash = accounts.values().any(|a| {
            a.platform_user_id == account.platform_user_id && a.internal_id != account.internal_id
        });
        if clash {
            return Err(StoreError::Duplicate(format!(
                "platform user {} already linked",
                account.platform_user_id
            )));
        }
        accounts.insert(account.internal_id.clone(), account.clone());
        self.record_mutation();
        Ok(())
    }

    fn delete_account(&self, id: &InternalId) -> Result<bool, StoreError> {
        self.check_writable()?;
        let removed = self.accounts.lock().unwrap().remove(id).is_some();
        if removed {
            self.record_mutation();
        }
        Ok(removed)
    }

    fn iter_accounts(&self) -> Result<Vec<LinkedAccount>, StoreError> {
        let mut all: Vec<_> = self.accounts.lock().unwrap().values().cloned().collect();
        all.sort_by(|a, b| a.internal_id.cmp(&b.internal_id));
        Ok(all)
    }
}

impl PartyRoleStore for NullStore {
    fn get_party_role(
        &self,
        party: &PartyId,
        community: &CommunityId,
    ) -> Result<Option<RoleId>, StoreError> {
        Ok(self
            .party_roles
            .lock()
            .unwrap()
            .get(&(community.clone(), party.clone()))
            .cloned())
    }

    fn put_party_role(
        &self,
        party: &PartyId,
        community: &CommunityId,
        role: &RoleId,
    ) -> Result<(), StoreError> {
        self.check_writable()?;
        self.party_roles
            .lock()
            .unwrap()
            .insert((community.clone(), party.clone()), role.clone());
        self.record_mutation();
        Ok(())
    }

    fn delete_party_role(
        &self,
        party: &PartyId,
        community: &CommunityId,
    ) -> Result<(), StoreError> {
        self.check_writable()?;
        self.party_roles
            .lock()
            .unwrap()
            .remove(&(community.clone(), party.clone()));
        self.record_mutation();
        Ok(())
    }

    fn party_roles_in(&self, community: &CommunityId) -> Result<Vec<PartyRoleBinding>, StoreError> {
        Ok(self
            .party_roles
            .lock()
            .unwrap()
            .iter()
            .filter(|((c, _), _)| c == community)
            .map(|((c, p), r)| PartyRoleBinding {
                party_id: p.clone(),
                community_id: c.clone(),
                role_id: r.clone(),
            })
            .collect())
    }
}
