//! Command dispatch.
//!
//! Every command produces exactly one [`Reply`]. Informational outcomes
//! (already verified, not linked, permission denied, lookup failed) become
//! friendly text; persistence failures are logged and answered generically.

use std::sync::Arc;

use chrono::NaiveTime;

use senatus_game::GameClient;
use senatus_platform::ChatPlatform;
use senatus_roles::RoleReconciler;
use senatus_types::{ChannelId, CommunityId, ExternalAccountId, LinkedAccount, PlatformUserId, RoleId};
use senatus_verification::{
    AccountStatus, ForceVerifyOutcome, UnlinkOutcome, VerificationEngine, VerificationError,
    VerifyOutcome,
};

use crate::broadcaster::{BroadcastRegistry, Broadcaster};
use crate::config::BotConfig;
use crate::reply::{account_embed, Reply};
use crate::shutdown::ShutdownController;
use crate::BotError;

pub const GENERIC_FAILURE: &str =
    "Something went wrong while processing your command. Please try again later.";
pub const PERMISSION_DENIED: &str = "You do not have permission to use this command.";
pub const ALREADY_BROADCASTING: &str = "Game updates are already running in this channel.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Verify {
        external_id: ExternalAccountId,
    },
    WhoAmI,
    /// Delete the invoker's link, or `target`'s (admin only).
    DeleteLink {
        target: Option<PlatformUserId>,
    },
    ForceVerify {
        user: PlatformUserId,
        external_id: ExternalAccountId,
    },
    ProcessPartyRoles,
    ProcessJobRoles,
    GameUpdate {
        ping_role: Option<RoleId>,
        ping_on_first_run: bool,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Verify { .. } => "verify",
            Self::WhoAmI => "whoami",
            Self::DeleteLink { .. } => "deletelink",
            Self::ForceVerify { .. } => "forceverify",
            Self::ProcessPartyRoles => "processpartyroles",
            Self::ProcessJobRoles => "processjobroles",
            Self::GameUpdate { .. } => "gameupdate",
        }
    }
}

/// A command plus where and by whom it was sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub community: CommunityId,
    pub channel: ChannelId,
    pub invoker: PlatformUserId,
    /// Display name, used in replies.
    pub invoker_name: String,
    pub command: Command,
}

/// The parts of [`BotConfig`] the handler needs.
#[derive(Clone, Debug)]
pub struct HandlerSettings {
    pub game_name: String,
    pub revoke_roles_on_unlink: bool,
    pub broadcast_at: NaiveTime,
}

impl HandlerSettings {
    pub fn from_config(config: &BotConfig) -> Result<Self, BotError> {
        Ok(Self {
            game_name: config.game_name.clone(),
            revoke_roles_on_unlink: config.revoke_roles_on_unlink,
            broadcast_at: config.broadcast_at()?,
        })
    }
}

pub struct CommandHandler {
    engine: Arc<VerificationEngine>,
    reconciler: Arc<RoleReconciler>,
    game: Arc<dyn GameClient>,
    platform: Arc<dyn ChatPlatform>,
    broadcasts: Arc<BroadcastRegistry>,
    shutdown: Arc<ShutdownController>,
    settings: HandlerSettings,
}

impl CommandHandler {
    pub fn new(
        engine: Arc<VerificationEngine>,
        reconciler: Arc<RoleReconciler>,
        game: Arc<dyn GameClient>,
        platform: Arc<dyn ChatPlatform>,
        broadcasts: Arc<BroadcastRegistry>,
        shutdown: Arc<ShutdownController>,
        settings: HandlerSettings,
    ) -> Self {
        Self {
            engine,
            reconciler,
            game,
            platform,
            broadcasts,
            shutdown,
            settings,
        }
    }

    pub fn broadcasts(&self) -> &Arc<BroadcastRegistry> {
        &self.broadcasts
    }

    /// Run one command to completion.
    pub async fn handle(&self, inv: &Invocation) -> Reply {
        tracing::debug!(
            command = inv.command.name(),
            community = %inv.community,
            invoker = %inv.invoker,
            "handling command"
        );
        match self.dispatch(inv).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(
                    command = inv.command.name(),
                    invoker = %inv.invoker,
                    error = %e,
                    "command failed"
                );
                Reply::text(GENERIC_FAILURE)
            }
        }
    }

    async fn dispatch(&self, inv: &Invocation) -> Result<Reply, BotError> {
        match &inv.command {
            Command::Verify { external_id } => self.verify(inv, external_id).await,
            Command::WhoAmI => self.whoami(inv).await,
            Command::DeleteLink { target } => self.delete_link(inv, target.as_ref()).await,
            Command::ForceVerify { user, external_id } => {
                self.force_verify(inv, user, external_id).await
            }
            Command::ProcessPartyRoles => {
                let accounts = self.engine.verified_accounts()?;
                let report = self
                    .reconciler
                    .reconcile_parties(&inv.community, &accounts)
                    .await;
                Ok(Reply::text(format!("Party roles processed: {report}.")))
            }
            Command::ProcessJobRoles => {
                let accounts = self.engine.verified_accounts()?;
                let report = self.reconciler.reconcile_jobs(&inv.community, &accounts).await;
                Ok(Reply::text(format!("Job roles processed: {report}.")))
            }
            Command::GameUpdate {
                ping_role,
                ping_on_first_run,
            } => Ok(self.game_update(inv, ping_role.clone(), *ping_on_first_run)),
        }
    }

    async fn verify(
        &self,
        inv: &Invocation,
        external_id: &ExternalAccountId,
    ) -> Result<Reply, BotError> {
        let game = &self.settings.game_name;
        let outcome = match self
            .engine
            .request_verification(&inv.invoker, external_id)
            .await
        {
            Ok(outcome) => outcome,
            Err(VerificationError::ExternalLookupFailed(_)) => {
                return Ok(Reply::text(format!(
                    "Could not find a {game} user with that ID. Please check and try again."
                )));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(match outcome {
            VerifyOutcome::AlreadyVerified(_) => {
                Reply::text(format!("Your {game} account is already verified."))
            }
            VerifyOutcome::VerifiedNow(account) => {
                self.sync_roles(&inv.community, &account).await;
                Reply::text(format!(
                    "Your {game} account (ID: {external_id}) has been successfully verified and \
                     linked to your Discord account ({}).",
                    inv.invoker_name
                ))
            }
            VerifyOutcome::CodeIssued { code, .. } => Reply::text(format!(
                "To verify your {game} account (ID: {external_id}), please add the following \
                 verification code to your {game} bio: `{code}`. After updating your bio, please \
                 run the /verify command again."
            )),
        })
    }

    async fn whoami(&self, inv: &Invocation) -> Result<Reply, BotError> {
        let game = &self.settings.game_name;
        let account = match self.engine.status(&inv.invoker)? {
            AccountStatus::NotLinked => {
                return Ok(Reply::text(format!(
                    "You have not linked your {game} account yet. Use /verify to link your account."
                )));
            }
            AccountStatus::Pending(_) => {
                return Ok(Reply::text(format!(
                    "Your {game} account is not verified yet. Please complete the verification \
                     process using /verify."
                )));
            }
            AccountStatus::Verified(account) => account,
        };

        match self.game.fetch_user(&account.external_account_id).await {
            Ok(user) => Ok(Reply::embed(account_embed(&user, game))),
            Err(e) => {
                tracing::warn!(invoker = %inv.invoker, error = %e, "whoami lookup failed");
                Ok(Reply::text(format!(
                    "Could not retrieve your {game} account information. Please try again later."
                )))
            }
        }
    }

    async fn delete_link(
        &self,
        inv: &Invocation,
        target: Option<&PlatformUserId>,
    ) -> Result<Reply, BotError> {
        let game = &self.settings.game_name;
        let target = target.unwrap_or(&inv.invoker);
        let own = target == &inv.invoker;

        let removed = match self.engine.unlink_platform_user(target, &inv.invoker).await {
            Ok(UnlinkOutcome::Removed(account)) => account,
            Ok(UnlinkOutcome::NotLinked) if own => {
                return Ok(Reply::text(format!("You do not have a linked {game} account.")));
            }
            Ok(UnlinkOutcome::NotLinked) => {
                return Ok(Reply::text(format!(
                    "{} does not have a linked {game} account.",
                    target.mention()
                )));
            }
            Err(VerificationError::PermissionDenied(_)) => {
                return Ok(Reply::text(PERMISSION_DENIED));
            }
            Err(e) => return Err(e.into()),
        };

        if self.settings.revoke_roles_on_unlink {
            if let Err(e) = self.reconciler.revoke_all(&inv.community, target).await {
                tracing::warn!(%target, error = %e, "revoking roles after unlink failed");
            }
        }

        Ok(Reply::text(if own {
            format!(
                "Your link to {game} account {} has been deleted.",
                removed.external_account_id
            )
        } else {
            format!(
                "The link between {} and {game} account {} has been deleted.",
                target.mention(),
                removed.external_account_id
            )
        }))
    }

    async fn force_verify(
        &self,
        inv: &Invocation,
        user: &PlatformUserId,
        external_id: &ExternalAccountId,
    ) -> Result<Reply, BotError> {
        let game = &self.settings.game_name;
        match self.engine.force_verify(user, external_id, &inv.invoker).await {
            Ok(ForceVerifyOutcome::Verified(account)) => {
                self.sync_roles(&inv.community, &account).await;
                Ok(Reply::text(format!(
                    "{} is now verified as {game} account {external_id}.",
                    user.mention()
                )))
            }
            Ok(ForceVerifyOutcome::AlreadyVerified(_)) => Ok(Reply::text(format!(
                "{} is already verified as {game} account {external_id}.",
                user.mention()
            ))),
            Err(VerificationError::PermissionDenied(_)) => Ok(Reply::text(PERMISSION_DENIED)),
            Err(e) => Err(e.into()),
        }
    }

    fn game_update(
        &self,
        inv: &Invocation,
        ping_role: Option<RoleId>,
        ping_on_first_run: bool,
    ) -> Reply {
        if !self.engine.is_admin(&inv.invoker) {
            return Reply::text(PERMISSION_DENIED);
        }
        if self.broadcasts.is_running(&inv.community, &inv.channel) {
            return Reply::text(ALREADY_BROADCASTING);
        }

        let at = self.settings.broadcast_at;
        let broadcaster = Broadcaster {
            game: self.game.clone(),
            platform: self.platform.clone(),
            channel: inv.channel.clone(),
            ping_role,
            ping_on_first_run,
            at,
            game_name: self.settings.game_name.clone(),
        };
        let started = self.broadcasts.start(
            &inv.community,
            &inv.channel,
            broadcaster.run(self.shutdown.subscribe()),
        );

        if started {
            tracing::info!(community = %inv.community, channel = %inv.channel, "game updates started");
            Reply::text(format!(
                "Game updates will be posted in this channel now and every day at {} UTC.",
                at.format("%H:%M")
            ))
        } else {
            // lost a race with a concurrent gameupdate for the same channel
            Reply::text(ALREADY_BROADCASTING)
        }
    }

    /// Party then job assignment for a freshly verified account.
    async fn sync_roles(&self, community: &CommunityId, account: &LinkedAccount) {
        let party = self
            .reconciler
            .assign_party_role(community, &account.platform_user_id, &account.external_account_id)
            .await;
        let job = self
            .reconciler
            .assign_job_role(community, &account.platform_user_id, &account.external_account_id)
            .await;
        tracing::info!(
            %community,
            user = %account.platform_user_id,
            party = ?party,
            job = ?job,
            "roles synced after verification"
        );
    }
}
