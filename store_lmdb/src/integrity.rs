//! Startup consistency checks for the account store.
//!
//! `users` and `users_by_platform` are written in one transaction, so every
//! record must have exactly one index entry pointing back at it and every
//! index entry must lead to a record carrying the same chat identity.
//! Party-role bindings must be `community/party` keys with a utf-8 role id.

use std::fmt;
use std::path::Path;

use heed::RoTxn;
use senatus_types::LinkedAccount;

use crate::{LmdbEnvironment, LmdbError};

/// One broken invariant found by [`check_integrity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inconsistency {
    /// A `users` value that does not decode.
    UndecodableRecord { key: String, reason: String },
    /// A record stored under a key other than its own internal id.
    MisfiledRecord { key: String, internal_id: String },
    /// A record whose chat identity has no index entry.
    MissingIndex { internal_id: String, platform_user_id: String },
    /// An index entry leading to another record, or to a record that
    /// belongs to a different chat identity.
    IndexMismatch { platform_user_id: String, internal_id: String },
    /// An index entry leading to no record at all.
    DanglingIndex { platform_user_id: String, internal_id: String },
    MalformedBinding { key: String },
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndecodableRecord { key, reason } => {
                write!(f, "record {key} does not decode: {reason}")
            }
            Self::MisfiledRecord { key, internal_id } => {
                write!(f, "record {internal_id} is stored under key {key}")
            }
            Self::MissingIndex { internal_id, platform_user_id } => write!(
                f,
                "record {internal_id} has no index entry for platform user {platform_user_id}"
            ),
            Self::IndexMismatch { platform_user_id, internal_id } => write!(
                f,
                "index entry for platform user {platform_user_id} points at record {internal_id} of someone else"
            ),
            Self::DanglingIndex { platform_user_id, internal_id } => write!(
                f,
                "index entry for platform user {platform_user_id} points at missing record {internal_id}"
            ),
            Self::MalformedBinding { key } => write!(f, "party role binding {key} is malformed"),
        }
    }
}

#[derive(Debug, Default)]
pub struct IntegrityReport {
    pub accounts: u64,
    pub index_entries: u64,
    pub party_roles: u64,
    pub problems: Vec<Inconsistency>,
}

impl IntegrityReport {
    pub fn is_healthy(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Cross-check the account records, the platform index and the party-role
/// bindings. Broken entries are collected, not treated as hard errors.
pub fn check_integrity(env: &LmdbEnvironment) -> Result<IntegrityReport, LmdbError> {
    let rtxn = env.env().read_txn()?;
    let mut report = IntegrityReport::default();

    check_records(env, &rtxn, &mut report)?;
    check_index(env, &rtxn, &mut report)?;

    for entry in env.party_roles_db.iter(&rtxn)? {
        let (key, value) = entry?;
        report.party_roles += 1;
        let key_ok = std::str::from_utf8(key)
            .ok()
            .and_then(|k| k.split_once('/'))
            .is_some_and(|(community, party)| !community.is_empty() && !party.is_empty());
        if !key_ok || std::str::from_utf8(value).is_err() {
            report.problems.push(Inconsistency::MalformedBinding {
                key: String::from_utf8_lossy(key).into_owned(),
            });
        }
    }

    Ok(report)
}

fn check_records(
    env: &LmdbEnvironment,
    rtxn: &RoTxn,
    report: &mut IntegrityReport,
) -> Result<(), LmdbError> {
    for entry in env.users_db.iter(rtxn)? {
        let (key, value) = entry?;
        report.accounts += 1;
        let key_str = String::from_utf8_lossy(key).into_owned();

        let account: LinkedAccount = match bincode::deserialize(value) {
            Ok(a) => a,
            Err(e) => {
                report.problems.push(Inconsistency::UndecodableRecord {
                    key: key_str,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        if account.internal_id.as_str().as_bytes() != key {
            report.problems.push(Inconsistency::MisfiledRecord {
                key: key_str.clone(),
                internal_id: account.internal_id.to_string(),
            });
        }

        let platform_key = account.platform_user_id.as_str().as_bytes();
        match env.users_by_platform_db.get(rtxn, platform_key)? {
            None => report.problems.push(Inconsistency::MissingIndex {
                internal_id: key_str,
                platform_user_id: account.platform_user_id.to_string(),
            }),
            Some(target) if target != key => report.problems.push(Inconsistency::IndexMismatch {
                platform_user_id: account.platform_user_id.to_string(),
                internal_id: String::from_utf8_lossy(target).into_owned(),
            }),
            Some(_) => {}
        }
    }
    Ok(())
}

fn check_index(
    env: &LmdbEnvironment,
    rtxn: &RoTxn,
    report: &mut IntegrityReport,
) -> Result<(), LmdbError> {
    for entry in env.users_by_platform_db.iter(rtxn)? {
        let (platform_key, target) = entry?;
        report.index_entries += 1;
        let platform_user_id = String::from_utf8_lossy(platform_key).into_owned();
        let internal_id = String::from_utf8_lossy(target).into_owned();

        let Some(value) = env.users_db.get(rtxn, target)? else {
            report.problems.push(Inconsistency::DanglingIndex {
                platform_user_id,
                internal_id,
            });
            continue;
        };
        // undecodable records were already reported by check_records
        if let Ok(account) = bincode::deserialize::<LinkedAccount>(value) {
            if account.platform_user_id.as_str().as_bytes() != platform_key {
                report.problems.push(Inconsistency::IndexMismatch {
                    platform_user_id,
                    internal_id,
                });
            }
        }
    }
    Ok(())
}

/// What [`check_data_dir`] found at the configured path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataDir {
    /// Nothing there yet, or an empty directory.
    Fresh,
    /// An existing LMDB store.
    Existing,
}

/// Refuse to open a store in a path that holds something other than one.
pub fn check_data_dir(path: &Path) -> Result<DataDir, LmdbError> {
    if !path.exists() {
        return Ok(DataDir::Fresh);
    }
    if !path.is_dir() {
        return Err(LmdbError::BadDataDir(format!(
            "{} is not a directory",
            path.display()
        )));
    }
    if path.join("data.mdb").is_file() {
        return Ok(DataDir::Existing);
    }
    if std::fs::read_dir(path)?.next().is_none() {
        return Ok(DataDir::Fresh);
    }
    Err(LmdbError::BadDataDir(format!(
        "{} is not empty but holds no data.mdb",
        path.display()
    )))
}
