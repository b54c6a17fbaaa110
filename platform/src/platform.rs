//! The chat-platform seam.

use async_trait::async_trait;
use senatus_types::{ChannelId, CommunityId, PlatformUserId, Role, RoleId, RoleSpec};

use crate::error::PlatformError;
use crate::message::OutgoingMessage;

/// Everything the bot needs from the chat platform.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// All roles currently defined in a community.
    async fn roles(&self, community: &CommunityId) -> Result<Vec<Role>, PlatformError>;

    async fn create_role(
        &self,
        community: &CommunityId,
        spec: &RoleSpec,
    ) -> Result<Role, PlatformError>;

    /// Move a role to `position` in the hierarchy. The platform rejects
    /// positions at or above the bot's own highest role.
    async fn set_role_position(
        &self,
        community: &CommunityId,
        role: &RoleId,
        position: u32,
    ) -> Result<(), PlatformError>;

    /// Roles held by a member, or `None` if the user is not in the community.
    async fn member_roles(
        &self,
        community: &CommunityId,
        user: &PlatformUserId,
    ) -> Result<Option<Vec<RoleId>>, PlatformError>;

    async fn add_member_role(
        &self,
        community: &CommunityId,
        user: &PlatformUserId,
        role: &RoleId,
    ) -> Result<(), PlatformError>;

    async fn remove_member_role(
        &self,
        community: &CommunityId,
        user: &PlatformUserId,
        role: &RoleId,
    ) -> Result<(), PlatformError>;

    async fn send_message(
        &self,
        channel: &ChannelId,
        message: &OutgoingMessage,
    ) -> Result<(), PlatformError>;

    /// Replace the deferred reply of a slash-command interaction.
    async fn edit_interaction_reply(
        &self,
        interaction_token: &str,
        message: &OutgoingMessage,
    ) -> Result<(), PlatformError>;
}
