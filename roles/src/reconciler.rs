//! The role reconciler.

use std::sync::Arc;

use senatus_game::GameClient;
use senatus_platform::{ChatPlatform, PlatformError};
use senatus_store::PartyRoleStore;
use senatus_types::{
    CommunityId, ExternalAccountId, JobTitle, LinkedAccount, PartyId, PlatformUserId, Role,
    RoleId, RoleSpec,
};
use tokio::sync::Mutex;

use crate::error::RoleError;
use crate::outcome::{AssignOutcome, BulkReport, SkipReason};

pub struct RoleReconciler {
    store: Arc<dyn PartyRoleStore>,
    game: Arc<dyn GameClient>,
    platform: Arc<dyn ChatPlatform>,
    /// Held while roles may be created, so two concurrent assignments
    /// cannot both create the same role.
    creating: Mutex<()>,
}

impl RoleReconciler {
    pub fn new(
        store: Arc<dyn PartyRoleStore>,
        game: Arc<dyn GameClient>,
        platform: Arc<dyn ChatPlatform>,
    ) -> Self {
        Self {
            store,
            game,
            platform,
            creating: Mutex::new(()),
        }
    }

    /// The community role for a party, creating it if needed.
    ///
    /// A cached binding whose role no longer exists is dropped and the role
    /// recreated. New roles are raised as high as the platform allows.
    pub async fn resolve_party_role(
        &self,
        community: &CommunityId,
        party: &PartyId,
    ) -> Result<RoleId, RoleError> {
        let _creating = self.creating.lock().await;
        let roles = self.platform.roles(community).await?;

        if let Some(role_id) = self.store.get_party_role(party, community)? {
            if roles.iter().any(|r| r.id == role_id) {
                return Ok(role_id);
            }
            tracing::warn!(%community, %party, role = %role_id, "party role was deleted, recreating");
            self.store.delete_party_role(party, community)?;
        }

        let meta = self.game.fetch_party(party).await?;
        let spec = RoleSpec::named(meta.name.clone()).with_color(meta.role_color());
        let role = self.platform.create_role(community, &spec).await?;
        tracing::info!(%community, %party, role = %role.id, name = %role.name, "party role created");

        // positions run from 0 (@everyone, already in `roles`) up to the
        // new role's slot at the top, which is `roles.len()`
        let top = roles.len() as u32;
        self.raise_role(community, &role, top).await;

        self.store.put_party_role(party, community, &role.id)?;
        Ok(role.id)
    }

    /// Try `top`, then each lower position, until the platform accepts one.
    async fn raise_role(&self, community: &CommunityId, role: &Role, top: u32) {
        for position in (1..=top).rev() {
            match self.platform.set_role_position(community, &role.id, position).await {
                Ok(()) => {
                    tracing::debug!(%community, role = %role.id, position, "role positioned");
                    return;
                }
                Err(e) => {
                    tracing::debug!(%community, role = %role.id, position, error = %e, "position rejected");
                }
            }
        }
        tracing::warn!(%community, role = %role.id, "no position accepted, leaving role where created");
    }

    /// The community role for a job title, creating the missing fixed job
    /// roles if this one does not exist. `None` in, `None` out.
    pub async fn resolve_job_role(
        &self,
        community: &CommunityId,
        job: Option<JobTitle>,
    ) -> Result<Option<RoleId>, RoleError> {
        let Some(job) = job else {
            return Ok(None);
        };
        let _creating = self.creating.lock().await;

        let roles = self.platform.roles(community).await?;
        if let Some(role) = find_named(&roles, job.role_name()) {
            return Ok(Some(role.id.clone()));
        }

        for title in JobTitle::ALL {
            if find_named(&roles, title.role_name()).is_none() {
                let role = self
                    .platform
                    .create_role(community, &RoleSpec::named(title.role_name()))
                    .await?;
                tracing::info!(%community, role = %role.id, job = %title, "job role created");
            }
        }

        let roles = self.platform.roles(community).await?;
        find_named(&roles, job.role_name())
            .map(|r| Some(r.id.clone()))
            .ok_or(RoleError::JobRoleMissing(job))
    }

    /// Give a member the role of their current party, removing any other
    /// party role they hold. Failures are logged and reported as skips.
    pub async fn assign_party_role(
        &self,
        community: &CommunityId,
        user: &PlatformUserId,
        external_id: &ExternalAccountId,
    ) -> AssignOutcome {
        let game_user = match self.game.fetch_user(external_id).await {
            Ok(u) => u,
            Err(e) => {
                tracing::warn!(%user, %external_id, error = %e, "party assignment: game lookup failed");
                return AssignOutcome::Skipped(SkipReason::LookupFailed);
            }
        };
        let Some(party) = game_user.party_id else {
            tracing::debug!(%user, %external_id, "party assignment: no party");
            return AssignOutcome::Skipped(SkipReason::NoParty);
        };

        let target = match self.resolve_party_role(community, &party).await {
            Ok(role) => role,
            Err(e) => {
                tracing::warn!(%community, %party, error = %e, "party assignment: role unavailable");
                return AssignOutcome::Skipped(SkipReason::RoleUnavailable);
            }
        };

        let known = match self.store.party_roles_in(community) {
            Ok(bindings) => bindings.into_iter().map(|b| b.role_id).collect::<Vec<_>>(),
            Err(e) => {
                tracing::error!(%community, error = %e, "party assignment: reading bindings failed");
                return AssignOutcome::Skipped(SkipReason::RoleUnavailable);
            }
        };

        self.apply_exclusive(community, user, &target, &known).await
    }

    /// Give a member the role of their current job, removing the other job
    /// roles. Without a job every job role is removed and the outcome is
    /// `Skipped(NoJob)`.
    pub async fn assign_job_role(
        &self,
        community: &CommunityId,
        user: &PlatformUserId,
        external_id: &ExternalAccountId,
    ) -> AssignOutcome {
        let game_user = match self.game.fetch_user(external_id).await {
            Ok(u) => u,
            Err(e) => {
                tracing::warn!(%user, %external_id, error = %e, "job assignment: game lookup failed");
                return AssignOutcome::Skipped(SkipReason::LookupFailed);
            }
        };

        let Some(job) = game_user.job_title() else {
            if let Err(e) = self.revoke_job_roles(community, user).await {
                tracing::warn!(%community, %user, error = %e, "job assignment: revoking stale job roles failed");
            }
            return AssignOutcome::Skipped(SkipReason::NoJob);
        };

        let target = match self.resolve_job_role(community, Some(job)).await {
            Ok(Some(role)) => role,
            Ok(None) => return AssignOutcome::Skipped(SkipReason::NoJob),
            Err(e) => {
                tracing::warn!(%community, %job, error = %e, "job assignment: role unavailable");
                return AssignOutcome::Skipped(SkipReason::RoleUnavailable);
            }
        };

        let known = match self.job_role_ids(community).await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(%community, error = %e, "job assignment: listing roles failed");
                return AssignOutcome::Skipped(SkipReason::PlatformFailed);
            }
        };

        self.apply_exclusive(community, user, &target, &known).await
    }

    /// Remove every known party role and every fixed job role from a member.
    ///
    /// Returns how many roles were removed; a non-member has none.
    pub async fn revoke_all(
        &self,
        community: &CommunityId,
        user: &PlatformUserId,
    ) -> Result<usize, RoleError> {
        let Some(held) = self.platform.member_roles(community, user).await? else {
            return Ok(0);
        };
        let mut known: Vec<RoleId> = self
            .store
            .party_roles_in(community)?
            .into_iter()
            .map(|b| b.role_id)
            .collect();
        known.extend(self.job_role_ids(community).await?);

        let mut removed = 0;
        for role in held.iter().filter(|r| known.contains(*r)) {
            self.platform.remove_member_role(community, user, role).await?;
            removed += 1;
        }
        tracing::info!(%community, %user, removed, "roles revoked");
        Ok(removed)
    }

    /// Party assignment for every account, one after another.
    pub async fn reconcile_parties(
        &self,
        community: &CommunityId,
        accounts: &[LinkedAccount],
    ) -> BulkReport {
        let mut report = BulkReport::default();
        for account in accounts {
            let outcome = self
                .assign_party_role(community, &account.platform_user_id, &account.external_account_id)
                .await;
            report.record(outcome);
        }
        tracing::info!(%community, %report, "party roles reconciled");
        report
    }

    /// Job assignment for every account, one after another.
    pub async fn reconcile_jobs(
        &self,
        community: &CommunityId,
        accounts: &[LinkedAccount],
    ) -> BulkReport {
        let mut report = BulkReport::default();
        for account in accounts {
            let outcome = self
                .assign_job_role(community, &account.platform_user_id, &account.external_account_id)
                .await;
            report.record(outcome);
        }
        tracing::info!(%community, %report, "job roles reconciled");
        report
    }

    /// Revoke every role in `category` except `target`, then grant `target`
    /// unless already held.
    async fn apply_exclusive(
        &self,
        community: &CommunityId,
        user: &PlatformUserId,
        target: &RoleId,
        category: &[RoleId],
    ) -> AssignOutcome {
        let held = match self.platform.member_roles(community, user).await {
            Ok(Some(held)) => held,
            Ok(None) => {
                tracing::debug!(%community, %user, "not a member, skipping");
                return AssignOutcome::Skipped(SkipReason::NotMember);
            }
            Err(e) => {
                tracing::warn!(%community, %user, error = %e, "reading member roles failed");
                return AssignOutcome::Skipped(SkipReason::PlatformFailed);
            }
        };

        let mut changed = false;
        let mut revoke_failed = false;
        for role in held.iter().filter(|r| *r != target && category.contains(*r)) {
            match self.platform.remove_member_role(community, user, role).await {
                Ok(()) => changed = true,
                Err(e) => {
                    tracing::warn!(%community, %user, %role, error = %e, "revoking role failed");
                    revoke_failed = true;
                }
            }
        }

        // granting now would leave the member with two roles of one category
        if revoke_failed {
            tracing::warn!(%community, %user, role = %target, "conflicting role still held, not granting");
            return AssignOutcome::Skipped(SkipReason::PlatformFailed);
        }

        if !held.contains(target) {
            if let Err(e) = self.platform.add_member_role(community, user, target).await {
                tracing::warn!(%community, %user, role = %target, error = %e, "granting role failed");
                return AssignOutcome::Skipped(SkipReason::PlatformFailed);
            }
            changed = true;
        }

        if changed {
            tracing::info!(%community, %user, role = %target, "role assigned");
            AssignOutcome::Assigned
        } else {
            AssignOutcome::Unchanged
        }
    }

    async fn revoke_job_roles(
        &self,
        community: &CommunityId,
        user: &PlatformUserId,
    ) -> Result<(), PlatformError> {
        let Some(held) = self.platform.member_roles(community, user).await? else {
            return Ok(());
        };
        let job_roles = self.job_role_ids(community).await?;
        for role in held.iter().filter(|r| job_roles.contains(*r)) {
            self.platform.remove_member_role(community, user, role).await?;
        }
        Ok(())
    }

    async fn job_role_ids(&self, community: &CommunityId) -> Result<Vec<RoleId>, PlatformError> {
        let roles = self.platform.roles(community).await?;
        Ok(roles
            .into_iter()
            .filter(|r| JobTitle::ALL.iter().any(|t| t.role_name() == r.name))
            .map(|r| r.id)
            .collect())
    }
}

fn find_named<'a>(roles: &'a [Role], name: &str) -> Option<&'a Role> {
    roles.iter().find(|r| r.name == name)
}
