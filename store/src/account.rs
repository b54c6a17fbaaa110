//! Linked-account storage trait.

use crate::StoreError;
use senatus_types::{InternalId, LinkedAccount, PlatformUserId};

/// Trait for linked-account storage operations.
///
/// Each method is one atomic unit: a failed call leaves the store as it was.
pub trait AccountStore: Send + Sync {
    fn get_account(&self, id: &InternalId) -> Result<Option<LinkedAccount>, StoreError>;

    /// Look up the record owned by a chat identity.
    fn get_account_by_platform(
        &self,
        platform_user: &PlatformUserId,
    ) -> Result<Option<LinkedAccount>, StoreError>;

    /// Insert or replace a record by `internal_id`.
    ///
    /// Fails with [`StoreError::Duplicate`] if another record already owns
    /// the same `platform_user_id`.
    fn put_account(&self, account: &LinkedAccount) -> Result<(), StoreError>;

    /// Remove a record. Returns `false` if it did not exist.
    fn delete_account(&self, id: &InternalId) -> Result<bool, StoreError>;

    fn iter_accounts(&self) -> Result<Vec<LinkedAccount>, StoreError>;

    fn iter_verified_accounts(&self) -> Result<Vec<LinkedAccount>, StoreError> {
        Ok(self
            .iter_accounts()?
            .into_iter()
            .filter(|a| a.verified)
            .collect())
    }

    fn account_count(&self) -> Result<u64, StoreError> {
        self.iter_accounts().map(|v| v.len() as u64)
    }
}
