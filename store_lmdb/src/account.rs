//! LMDB implementation of AccountStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use senatus_store::{AccountStore, StoreError};
use senatus_types::{InternalId, LinkedAccount, PlatformUserId};

use crate::LmdbError;

/// `users` holds the records keyed by internal id; `users_by_platform` is a
/// unique index from chat identity to internal id, maintained in the same
/// write transaction.
pub struct LmdbAccountStore {
    pub(crate) env: Arc<Env>,
    pub(crate) users_db: Database<Bytes, Bytes>,
    pub(crate) users_by_platform_db: Database<Bytes, Bytes>,
}

fn decode(bytes: &[u8]) -> Result<LinkedAccount, LmdbError> {
    Ok(bincode::deserialize(bytes)?)
}

impl AccountStore for LmdbAccountStore {
    fn get_account(&self, id: &InternalId) -> Result<Option<LinkedAccount>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .users_db
            .get(&rtxn, id.as_str().as_bytes())
            .map_err(LmdbError::from)?;
        Ok(val.map(decode).transpose()?)
    }

    fn get_account_by_platform(
        &self,
        platform_user: &PlatformUserId,
    ) -> Result<Option<LinkedAccount>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let Some(internal) = self
            .users_by_platform_db
            .get(&rtxn, platform_user.as_str().as_bytes())
            .map_err(LmdbError::from)?
        else {
            return Ok(None);
        };
        let val = self
            .users_db
            .get(&rtxn, internal)
            .map_err(LmdbError::from)?
            .ok_or_else(|| {
                StoreError::Corruption(format!(
                    "platform index for {platform_user} points at a missing record"
                ))
            })?;
        Ok(Some(decode(val)?))
    }

    fn put_account(&self, account: &LinkedAccount) -> Result<(), StoreError> {
        let key = account.internal_id.as_str().as_bytes();
        let platform_key = account.platform_user_id.as_str().as_bytes();
        let value = bincode::serialize(account).map_err(LmdbError::from)?;

        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;

        if let Some(owner) = self
            .users_by_platform_db
            .get(&wtxn, platform_key)
            .map_err(LmdbError::from)?
        {
            if owner != key {
                return Err(StoreError::Duplicate(format!(
                    "platform user {} already linked",
                    account.platform_user_id
                )));
            }
        }

        let previous = self
            .users_db
            .get(&wtxn, key)
            .map_err(LmdbError::from)?
            .map(decode)
            .transpose()?;
        if let Some(prev) = previous {
            if prev.platform_user_id != account.platform_user_id {
                self.users_by_platform_db
                    .delete(&mut wtxn, prev.platform_user_id.as_str().as_bytes())
                    .map_err(LmdbError::from)?;
            }
        }

        self.users_db
            .put(&mut wtxn, key, &value)
            .map_err(LmdbError::from)?;
        self.users_by_platform_db
            .put(&mut wtxn, platform_key, key)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn delete_account(&self, id: &InternalId) -> Result<bool, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let existing = self
            .users_db
            .get(&wtxn, id.as_str().as_bytes())
            .map_err(LmdbError::from)?
            .map(decode)
            .transpose()?;
        let Some(existing) = existing else {
            return Ok(false);
        };
        self.users_db
            .delete(&mut wtxn, id.as_str().as_bytes())
            .map_err(LmdbError::from)?;
        self.users_by_platform_db
            .delete(&mut wtxn, existing.platform_user_id.as_str().as_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(true)
    }

    fn iter_accounts(&self) -> Result<Vec<LinkedAccount>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self.users_db.iter(&rtxn).map_err(LmdbError::from)?;
        let mut result = Vec::new();
        for entry in iter {
            let (_key, val) = entry.map_err(LmdbError::from)?;
            result.push(decode(val)?);
        }
        Ok(result)
    }

    fn account_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.users_db.len(&rtxn).map_err(LmdbError::from)?)
    }
}
