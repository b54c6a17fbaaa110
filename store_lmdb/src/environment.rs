//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::account::LmdbAccountStore;
use crate::party_role::LmdbPartyRoleStore;
use crate::LmdbError;

/// Schema version written to the `meta` database on first open.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

const SCHEMA_VERSION_KEY: &[u8] = b"schema_version";

/// Default map size: 64 MiB is far beyond what a single community needs.
pub const DEFAULT_MAP_SIZE: usize = 64 * 1024 * 1024;

const MAX_DBS: u32 = 8;

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    pub(crate) users_db: Database<Bytes, Bytes>,
    pub(crate) users_by_platform_db: Database<Bytes, Bytes>,
    pub(crate) party_roles_db: Database<Bytes, Bytes>,
    meta_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given directory.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment is opened once per process and per path; the
        // daemon never opens the same directory twice.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let users_db = env.create_database(&mut wtxn, Some("users"))?;
        let users_by_platform_db = env.create_database(&mut wtxn, Some("users_by_platform"))?;
        let party_roles_db = env.create_database(&mut wtxn, Some("party_roles"))?;
        let meta_db: Database<Bytes, Bytes> = env.create_database(&mut wtxn, Some("meta"))?;

        let stored = match meta_db.get(&wtxn, SCHEMA_VERSION_KEY)? {
            Some(bytes) if bytes.len() == 4 => {
                let arr: [u8; 4] = bytes.try_into().map_err(|_| {
                    LmdbError::Serialization("schema_version has unexpected byte length".into())
                })?;
                u32::from_le_bytes(arr)
            }
            Some(_) => {
                return Err(LmdbError::Serialization(
                    "schema_version has unexpected byte length".into(),
                ))
            }
            None => 0,
        };

        if stored > CURRENT_SCHEMA_VERSION {
            return Err(LmdbError::SchemaTooNew {
                found: stored,
                supported: CURRENT_SCHEMA_VERSION,
            });
        }
        if stored < CURRENT_SCHEMA_VERSION {
            meta_db.put(
                &mut wtxn,
                SCHEMA_VERSION_KEY,
                &CURRENT_SCHEMA_VERSION.to_le_bytes(),
            )?;
            tracing::info!(
                from = stored,
                to = CURRENT_SCHEMA_VERSION,
                "initialised database schema"
            );
        }
        wtxn.commit()?;

        tracing::debug!(path = %path.display(), "opened LMDB environment");

        Ok(Self {
            env: Arc::new(env),
            users_db,
            users_by_platform_db,
            party_roles_db,
            meta_db,
        })
    }

    /// Handle implementing [`senatus_store::AccountStore`].
    pub fn account_store(&self) -> LmdbAccountStore {
        LmdbAccountStore {
            env: Arc::clone(&self.env),
            users_db: self.users_db,
            users_by_platform_db: self.users_by_platform_db,
        }
    }

    /// Handle implementing [`senatus_store::PartyRoleStore`].
    pub fn party_role_store(&self) -> LmdbPartyRoleStore {
        LmdbPartyRoleStore {
            env: Arc::clone(&self.env),
            party_roles_db: self.party_roles_db,
        }
    }

    pub fn env(&self) -> &Arc<Env> {
        &self.env
    }

    pub fn schema_version(&self) -> Result<u32, LmdbError> {
        let rtxn = self.env.read_txn()?;
        match self.meta_db.get(&rtxn, SCHEMA_VERSION_KEY)? {
            Some(bytes) if bytes.len() == 4 => {
                let mut arr = [0u8; 4];
                arr.copy_from_slice(bytes);
                Ok(u32::from_le_bytes(arr))
            }
            _ => Ok(0),
        }
    }
}
