//! The verification engine: ties the store, the game client and the code
//! source into the link lifecycle.

use std::sync::Arc;

use senatus_game::GameClient;
use senatus_store::AccountStore;
use senatus_types::{
    CodeSource, ExternalAccountId, InternalId, LinkedAccount, PlatformUserId, VerificationCode,
};

use crate::admins::AdminSet;
use crate::error::VerificationError;
use crate::locks::IdentityLocks;
use crate::outcome::{AccountStatus, ForceVerifyOutcome, UnlinkOutcome, VerifyOutcome};

/// Draws before giving up on getting a code different from the previous one.
const MAX_CODE_DRAWS: usize = 16;

/// Draws before giving up on an unused internal id.
const MAX_ID_DRAWS: usize = 16;

pub struct VerificationEngine {
    store: Arc<dyn AccountStore>,
    game: Arc<dyn GameClient>,
    codes: Arc<dyn CodeSource>,
    admins: AdminSet,
    locks: IdentityLocks,
}

impl VerificationEngine {
    pub fn new(
        store: Arc<dyn AccountStore>,
        game: Arc<dyn GameClient>,
        codes: Arc<dyn CodeSource>,
        admins: AdminSet,
    ) -> Self {
        Self {
            store,
            game,
            codes,
            admins,
            locks: IdentityLocks::new(),
        }
    }

    pub fn is_admin(&self, id: &PlatformUserId) -> bool {
        self.admins.contains(id)
    }

    pub fn admins(&self) -> &AdminSet {
        &self.admins
    }

    /// Start or complete linking `platform_user` to `external_id`.
    ///
    /// The game account is fetched first; if that fails nothing is written.
    /// Otherwise the caller's record is created, checked against the bio, or
    /// given a fresh code.
    pub async fn request_verification(
        &self,
        platform_user: &PlatformUserId,
        external_id: &ExternalAccountId,
    ) -> Result<VerifyOutcome, VerificationError> {
        let _guard = self.locks.lock(platform_user).await;

        let game_user = self.game.fetch_user(external_id).await.map_err(|e| {
            tracing::debug!(%platform_user, %external_id, error = %e, "game account lookup failed");
            e
        })?;

        let mut account = match self.store.get_account_by_platform(platform_user)? {
            Some(existing) => existing,
            None => LinkedAccount::new(
                self.fresh_internal_id()?,
                platform_user.clone(),
                external_id.clone(),
            ),
        };

        if account.verified {
            return Ok(VerifyOutcome::AlreadyVerified(account));
        }

        if &account.external_account_id != external_id {
            tracing::info!(
                %platform_user,
                from = %account.external_account_id,
                to = %external_id,
                "rebinding pending link to a different game account"
            );
            account.external_account_id = external_id.clone();
            account.pending_code = None;
        }

        if let Some(code) = &account.pending_code {
            if code.appears_in(&game_user.bio) {
                account.verified = true;
                account.pending_code = None;
                self.store.put_account(&account)?;
                tracing::info!(%platform_user, %external_id, "account verified");
                return Ok(VerifyOutcome::VerifiedNow(account));
            }
        }

        let code = self.fresh_code(account.pending_code.as_ref());
        account.pending_code = Some(code.clone());
        self.store.put_account(&account)?;
        tracing::info!(%platform_user, %external_id, "verification code issued");
        Ok(VerifyOutcome::CodeIssued { code, account })
    }

    /// Mark `platform_user` as verified for `external_id` without a code exchange.
    ///
    /// Only administrators may do this. An existing record is reused and
    /// rebound; the game account is not looked up.
    pub async fn force_verify(
        &self,
        platform_user: &PlatformUserId,
        external_id: &ExternalAccountId,
        requested_by: &PlatformUserId,
    ) -> Result<ForceVerifyOutcome, VerificationError> {
        if !self.is_admin(requested_by) {
            tracing::warn!(%requested_by, %platform_user, "forceverify refused");
            return Err(VerificationError::PermissionDenied(requested_by.to_string()));
        }

        let _guard = self.locks.lock(platform_user).await;

        let mut account = match self.store.get_account_by_platform(platform_user)? {
            Some(existing) => {
                if existing.verified && &existing.external_account_id == external_id {
                    return Ok(ForceVerifyOutcome::AlreadyVerified(existing));
                }
                existing
            }
            None => LinkedAccount::new(
                self.fresh_internal_id()?,
                platform_user.clone(),
                external_id.clone(),
            ),
        };

        account.external_account_id = external_id.clone();
        account.verified = true;
        account.pending_code = None;
        self.store.put_account(&account)?;
        tracing::info!(%platform_user, %external_id, %requested_by, "account force-verified");
        Ok(ForceVerifyOutcome::Verified(account))
    }

    /// Delete a record by its internal id. Role grants are left alone.
    pub async fn unlink(&self, internal_id: &InternalId) -> Result<UnlinkOutcome, VerificationError> {
        let Some(account) = self.store.get_account(internal_id)? else {
            return Ok(UnlinkOutcome::NotLinked);
        };
        let _guard = self.locks.lock(&account.platform_user_id).await;
        if self.store.delete_account(internal_id)? {
            tracing::info!(%internal_id, platform_user = %account.platform_user_id, "link deleted");
            Ok(UnlinkOutcome::Removed(account))
        } else {
            Ok(UnlinkOutcome::NotLinked)
        }
    }

    /// Delete `target`'s link on behalf of `requested_by`.
    ///
    /// Users may always delete their own link; deleting someone else's
    /// requires administrator rights.
    pub async fn unlink_platform_user(
        &self,
        target: &PlatformUserId,
        requested_by: &PlatformUserId,
    ) -> Result<UnlinkOutcome, VerificationError> {
        if target != requested_by && !self.is_admin(requested_by) {
            tracing::warn!(%requested_by, %target, "deletelink refused");
            return Err(VerificationError::PermissionDenied(requested_by.to_string()));
        }

        let _guard = self.locks.lock(target).await;
        let Some(account) = self.store.get_account_by_platform(target)? else {
            return Ok(UnlinkOutcome::NotLinked);
        };
        if !self.store.delete_account(&account.internal_id)? {
            return Ok(UnlinkOutcome::NotLinked);
        }
        tracing::info!(%target, %requested_by, internal_id = %account.internal_id, "link deleted");
        Ok(UnlinkOutcome::Removed(account))
    }

    pub fn status(&self, platform_user: &PlatformUserId) -> Result<AccountStatus, VerificationError> {
        Ok(match self.store.get_account_by_platform(platform_user)? {
            None => AccountStatus::NotLinked,
            Some(account) if account.verified => AccountStatus::Verified(account),
            Some(account) => AccountStatus::Pending(account),
        })
    }

    /// Every verified record, for bulk role runs.
    pub fn verified_accounts(&self) -> Result<Vec<LinkedAccount>, VerificationError> {
        Ok(self.store.iter_verified_accounts()?)
    }

    fn fresh_code(&self, previous: Option<&VerificationCode>) -> VerificationCode {
        let mut code = self.codes.next_code();
        for _ in 1..MAX_CODE_DRAWS {
            if Some(&code) != previous {
                break;
            }
            code = self.codes.next_code();
        }
        if Some(&code) == previous {
            tracing::warn!("code source kept repeating the previous code");
        }
        code
    }

    fn fresh_internal_id(&self) -> Result<InternalId, VerificationError> {
        for _ in 0..MAX_ID_DRAWS {
            let id = self.codes.next_internal_id();
            if self.store.get_account(&id)?.is_none() {
                return Ok(id);
            }
            tracing::debug!(%id, "internal id collision, drawing again");
        }
        Err(VerificationError::Store(senatus_store::StoreError::Duplicate(
            "could not allocate an unused internal id".into(),
        )))
    }
}
