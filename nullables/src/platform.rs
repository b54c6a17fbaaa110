//! Nullable chat platform: in-memory communities, roles and members.

use async_trait::async_trait;
use senatus_platform::{ChatPlatform, OutgoingMessage, PlatformError};
use senatus_types::{ChannelId, CommunityId, PlatformUserId, Role, RoleColor, RoleId, RoleSpec};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Default)]
struct Community {
    roles: Vec<Role>,
    members: HashMap<PlatformUserId, Vec<RoleId>>,
    /// Position of the bot's own highest role.
    ceiling: u32,
}

/// An in-memory chat platform.
///
/// Behaves like Discord where the reconciler cares: new roles land at
/// position 1, positions at or above the bot's ceiling are refused, and
/// granting a role the community does not have fails.
pub struct NullPlatform {
    communities: Mutex<HashMap<CommunityId, Community>>,
    next_role_id: AtomicU64,
    position_attempts: Mutex<Vec<(RoleId, u32)>>,
    messages: Mutex<Vec<(ChannelId, OutgoingMessage)>>,
    replies: Mutex<Vec<(String, OutgoingMessage)>>,
    created_roles: AtomicU64,
    fail_role_creation: AtomicBool,
    fail_grants: AtomicBool,
    fail_revokes: AtomicBool,
}

impl NullPlatform {
    pub fn new() -> Self {
        Self {
            communities: Mutex::new(HashMap::new()),
            next_role_id: AtomicU64::new(5000),
            position_attempts: Mutex::new(Vec::new()),
            messages: Mutex::new(Vec::new()),
            replies: Mutex::new(Vec::new()),
            created_roles: AtomicU64::new(0),
            fail_role_creation: AtomicBool::new(false),
            fail_grants: AtomicBool::new(false),
            fail_revokes: AtomicBool::new(false),
        }
    }

    /// Register a community with only the base role and the bot's ceiling.
    pub fn add_community(&self, community: &str, ceiling: u32) {
        let id = CommunityId::new(community);
        let everyone = Role {
            id: RoleId::new(community),
            name: "@everyone".to_string(),
            color: RoleColor::DEFAULT,
            position: 0,
        };
        self.communities.lock().unwrap().insert(
            id,
            Community {
                roles: vec![everyone],
                members: HashMap::new(),
                ceiling,
            },
        );
    }

    /// Pre-existing role, created out of band.
    pub fn add_role(&self, community: &str, name: &str, position: u32) -> RoleId {
        let id = self.allocate_role_id();
        if let Some(c) = self
            .communities
            .lock()
            .unwrap()
            .get_mut(&CommunityId::new(community))
        {
            c.roles.push(Role {
                id: id.clone(),
                name: name.to_string(),
                color: RoleColor::DEFAULT,
                position,
            });
        }
        id
    }

    pub fn add_member(&self, community: &str, user: &str) {
        if let Some(c) = self
            .communities
            .lock()
            .unwrap()
            .get_mut(&CommunityId::new(community))
        {
            c.members.entry(PlatformUserId::new(user)).or_default();
        }
    }

    /// Delete a role as an admin would, stripping it from every member.
    pub fn delete_role(&self, community: &str, role: &RoleId) {
        if let Some(c) = self
            .communities
            .lock()
            .unwrap()
            .get_mut(&CommunityId::new(community))
        {
            c.roles.retain(|r| &r.id != role);
            for held in c.members.values_mut() {
                held.retain(|r| r != role);
            }
        }
    }

    /// Roles a member currently holds.
    pub fn roles_of(&self, community: &str, user: &str) -> Vec<RoleId> {
        self.communities
            .lock()
            .unwrap()
            .get(&CommunityId::new(community))
            .and_then(|c| c.members.get(&PlatformUserId::new(user)).cloned())
            .unwrap_or_default()
    }

    pub fn role_named(&self, community: &str, name: &str) -> Option<Role> {
        self.communities
            .lock()
            .unwrap()
            .get(&CommunityId::new(community))
            .and_then(|c| c.roles.iter().find(|r| r.name == name).cloned())
    }

    pub fn role_count(&self, community: &str) -> usize {
        self.communities
            .lock()
            .unwrap()
            .get(&CommunityId::new(community))
            .map(|c| c.roles.len())
            .unwrap_or(0)
    }

    pub fn created_role_count(&self) -> u64 {
        self.created_roles.load(Ordering::SeqCst)
    }

    /// Every `set_role_position` call, accepted or not.
    pub fn position_attempts(&self) -> Vec<(RoleId, u32)> {
        self.position_attempts.lock().unwrap().clone()
    }

    pub fn sent_messages(&self) -> Vec<(ChannelId, OutgoingMessage)> {
        self.messages.lock().unwrap().clone()
    }

    /// Interaction replies, keyed by interaction token.
    pub fn interaction_replies(&self) -> Vec<(String, OutgoingMessage)> {
        self.replies.lock().unwrap().clone()
    }

    pub fn set_fail_role_creation(&self, fail: bool) {
        self.fail_role_creation.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_grants(&self, fail: bool) {
        self.fail_grants.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_revokes(&self, fail: bool) {
        self.fail_revokes.store(fail, Ordering::SeqCst);
    }

    fn allocate_role_id(&self) -> RoleId {
        RoleId::new(self.next_role_id.fetch_add(1, Ordering::SeqCst).to_string())
    }
}

impl Default for NullPlatform {
    fn default() -> Self {
        Self::new()
    }
}

fn unknown_community(community: &CommunityId) -> PlatformError {
    PlatformError::NotFound(format!("guild {community}"))
}

#[async_trait]
impl ChatPlatform for NullPlatform {
    async fn roles(&self, community: &CommunityId) -> Result<Vec<Role>, PlatformError> {
        self.communities
            .lock()
            .unwrap()
            .get(community)
            .map(|c| c.roles.clone())
            .ok_or_else(|| unknown_community(community))
    }

    async fn create_role(
        &self,
        community: &CommunityId,
        spec: &RoleSpec,
    ) -> Result<Role, PlatformError> {
        if self.fail_role_creation.load(Ordering::SeqCst) {
            return Err(PlatformError::Forbidden("manage roles".into()));
        }
        let id = self.allocate_role_id();
        let mut communities = self.communities.lock().unwrap();
        let c = communities
            .get_mut(community)
            .ok_or_else(|| unknown_community(community))?;
        let role = Role {
            id,
            name: spec.name.clone(),
            color: spec.color,
            position: 1,
        };
        c.roles.push(role.clone());
        self.created_roles.fetch_add(1, Ordering::SeqCst);
        Ok(role)
    }

    async fn set_role_position(
        &self,
        community: &CommunityId,
        role: &RoleId,
        position: u32,
    ) -> Result<(), PlatformError> {
        self.position_attempts
            .lock()
            .unwrap()
            .push((role.clone(), position));
        let mut communities = self.communities.lock().unwrap();
        let c = communities
            .get_mut(community)
            .ok_or_else(|| unknown_community(community))?;
        if position >= c.ceiling {
            return Err(PlatformError::Forbidden(format!(
                "position {position} is not below the bot's highest role"
            )));
        }
        let r = c
            .roles
            .iter_mut()
            .find(|r| &r.id == role)
            .ok_or_else(|| PlatformError::NotFound(format!("role {role}")))?;
        r.position = position;
        Ok(())
    }

    async fn member_roles(
        &self,
        community: &CommunityId,
        user: &PlatformUserId,
    ) -> Result<Option<Vec<RoleId>>, PlatformError> {
        let communities = self.communities.lock().unwrap();
        let c = communities
            .get(community)
            .ok_or_else(|| unknown_community(community))?;
        Ok(c.members.get(user).cloned())
    }

    async fn add_member_role(
        &self,
        community: &CommunityId,
        user: &PlatformUserId,
        role: &RoleId,
    ) -> Result<(), PlatformError> {
        if self.fail_grants.load(Ordering::SeqCst) {
            return Err(PlatformError::Forbidden("manage roles".into()));
        }
        let mut communities = self.communities.lock().unwrap();
        let c = communities
            .get_mut(community)
            .ok_or_else(|| unknown_community(community))?;
        if !c.roles.iter().any(|r| &r.id == role) {
            return Err(PlatformError::NotFound(format!("role {role}")));
        }
        let held = c
            .members
            .get_mut(user)
            .ok_or_else(|| PlatformError::NotFound(format!("member {user}")))?;
        if !held.contains(role) {
            held.push(role.clone());
        }
        Ok(())
    }

    async fn remove_member_role(
        &self,
        community: &CommunityId,
        user: &PlatformUserId,
        role: &RoleId,
    ) -> Result<(), PlatformError> {
        if self.fail_revokes.load(Ordering::SeqCst) {
            return Err(PlatformError::Forbidden("manage roles".into()));
        }
        let mut communities = self.communities.lock().unwrap();
        let c = communities
            .get_mut(community)
            .ok_or_else(|| unknown_community(community))?;
        let held = c
            .members
            .get_mut(user)
            .ok_or_else(|| PlatformError::NotFound(format!("member {user}")))?;
        held.retain(|r| r != role);
        Ok(())
    }

    async fn send_message(
        &self,
        channel: &ChannelId,
        message: &OutgoingMessage,
    ) -> Result<(), PlatformError> {
        self.messages
            .lock()
            .unwrap()
            .push((channel.clone(), message.clone()));
        Ok(())
    }

    async fn edit_interaction_reply(
        &self,
        interaction_token: &str,
        message: &OutgoingMessage,
    ) -> Result<(), PlatformError> {
        self.replies
            .lock()
            .unwrap()
            .push((interaction_token.to_string(), message.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn created_roles_start_at_position_one() {
        let platform = NullPlatform::new();
        platform.add_community("g", 3);
        let role = platform
            .create_role(&CommunityId::new("g"), &RoleSpec::named("Senator"))
            .await
            .unwrap();
        assert_eq!(role.position, 1);
        assert_eq!(platform.role_count("g"), 2);
        assert_eq!(platform.created_role_count(), 1);
    }

    #[tokio::test]
    async fn positions_at_ceiling_are_refused() {
        let platform = NullPlatform::new();
        platform.add_community("g", 3);
        let role = platform.add_role("g", "Party", 1);
        let g = CommunityId::new("g");
        assert!(platform.set_role_position(&g, &role, 3).await.is_err());
        platform.set_role_position(&g, &role, 2).await.unwrap();
        assert_eq!(platform.role_named("g", "Party").unwrap().position, 2);
        assert_eq!(platform.position_attempts().len(), 2);
    }

    #[tokio::test]
    async fn granting_deleted_role_fails() {
        let platform = NullPlatform::new();
        platform.add_community("g", 10);
        platform.add_member("g", "u");
        let role = platform.add_role("g", "Party", 1);
        let g = CommunityId::new("g");
        let u = PlatformUserId::new("u");
        platform.add_member_role(&g, &u, &role).await.unwrap();
        platform.delete_role("g", &role);
        assert!(platform.roles_of("g", "u").is_empty());
        assert!(matches!(
            platform.add_member_role(&g, &u, &role).await,
            Err(PlatformError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn non_member_has_no_roles() {
        let platform = NullPlatform::new();
        platform.add_community("g", 10);
        let roles = platform
            .member_roles(&CommunityId::new("g"), &PlatformUserId::new("nobody"))
            .await
            .unwrap();
        assert!(roles.is_none());
    }
}
