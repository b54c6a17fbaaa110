//! Discord REST (v10) implementation of [`ChatPlatform`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Deserialize;

use senatus_types::{ChannelId, CommunityId, PlatformUserId, Role, RoleColor, RoleId, RoleSpec};

use crate::error::PlatformError;
use crate::message::OutgoingMessage;
use crate::platform::ChatPlatform;

pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Longest rate-limit pause we sit through before giving up on a request.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(5);

/// Bot-authenticated Discord REST client.
pub struct DiscordClient {
    api_base: String,
    token: String,
    application_id: String,
    http_client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct WireRole {
    id: String,
    name: String,
    #[serde(default)]
    color: u32,
    #[serde(default)]
    position: u32,
}

impl From<WireRole> for Role {
    fn from(w: WireRole) -> Self {
        Role {
            id: RoleId::new(w.id),
            name: w.name,
            color: RoleColor::new(w.color),
            position: w.position,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireMember {
    #[serde(default)]
    roles: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct WireRateLimit {
    #[serde(default)]
    retry_after: f64,
}

impl DiscordClient {
    pub fn new(
        api_base: impl Into<String>,
        token: impl Into<String>,
        application_id: impl Into<String>,
    ) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .user_agent(concat!(
                "DiscordBot (https://github.com/senatus-bot/senatus, ",
                env!("CARGO_PKG_VERSION"),
                ")"
            ))
            .build()
            .unwrap_or_default();
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
            application_id: application_id.into(),
            http_client,
        }
    }

    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    /// Send one request, sitting through a single short rate-limit pause.
    ///
    /// `what` names the target for [`PlatformError::NotFound`].
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        what: &str,
    ) -> Result<reqwest::Response, PlatformError> {
        let url = format!("{}{}", self.api_base, path);
        let mut retried = false;
        loop {
            let mut request = self
                .http_client
                .request(method.clone(), &url)
                .header("Authorization", format!("Bot {}", self.token));
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request.send().await.map_err(|e| {
                if e.is_timeout() {
                    PlatformError::Unreachable(format!("request timed out: {e}"))
                } else if e.is_connect() {
                    PlatformError::Unreachable(format!("connection failed: {e}"))
                } else {
                    PlatformError::RequestFailed(e.to_string())
                }
            })?;

            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }

            match status {
                StatusCode::TOO_MANY_REQUESTS => {
                    let retry_after = response
                        .json::<WireRateLimit>()
                        .await
                        .map(|r| Duration::from_secs_f64(r.retry_after.max(0.0)))
                        .unwrap_or(MAX_RETRY_AFTER);
                    if retried || retry_after > MAX_RETRY_AFTER {
                        return Err(PlatformError::RateLimited {
                            retry_after_ms: retry_after.as_millis() as u64,
                        });
                    }
                    tracing::debug!(path, ?retry_after, "rate limited, retrying once");
                    tokio::time::sleep(retry_after).await;
                    retried = true;
                }
                StatusCode::NOT_FOUND => return Err(PlatformError::NotFound(what.to_string())),
                StatusCode::FORBIDDEN => {
                    let body = response.text().await.unwrap_or_default();
                    return Err(PlatformError::Forbidden(format!("{what}: {body}")));
                }
                _ => {
                    let body = response.text().await.unwrap_or_default();
                    tracing::warn!(path, %status, body = %body, "discord request failed");
                    return Err(PlatformError::RequestFailed(format!("HTTP status {status}")));
                }
            }
        }
    }

    /// Replace the bot's slash commands, globally or for one guild.
    ///
    /// Returns how many commands Discord now has registered.
    pub async fn overwrite_commands(
        &self,
        guild: Option<&CommunityId>,
        commands: &serde_json::Value,
    ) -> Result<usize, PlatformError> {
        let path = match guild {
            Some(g) => format!("/applications/{}/guilds/{g}/commands", self.application_id),
            None => format!("/applications/{}/commands", self.application_id),
        };
        let response = self
            .send(Method::PUT, &path, Some(commands), "application")
            .await?;
        let registered: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| PlatformError::InvalidResponse(e.to_string()))?;
        Ok(registered.len())
    }
}

#[async_trait]
impl ChatPlatform for DiscordClient {
    async fn roles(&self, community: &CommunityId) -> Result<Vec<Role>, PlatformError> {
        let response = self
            .send(
                Method::GET,
                &format!("/guilds/{community}/roles"),
                None,
                &format!("guild {community}"),
            )
            .await?;
        let roles: Vec<WireRole> = response
            .json()
            .await
            .map_err(|e| PlatformError::InvalidResponse(e.to_string()))?;
        Ok(roles.into_iter().map(Role::from).collect())
    }

    async fn create_role(
        &self,
        community: &CommunityId,
        spec: &RoleSpec,
    ) -> Result<Role, PlatformError> {
        let body = serde_json::json!({
            "name": spec.name,
            "color": spec.color.value(),
            "mentionable": spec.mentionable,
        });
        let response = self
            .send(
                Method::POST,
                &format!("/guilds/{community}/roles"),
                Some(&body),
                &format!("guild {community}"),
            )
            .await?;
        let role: WireRole = response
            .json()
            .await
            .map_err(|e| PlatformError::InvalidResponse(e.to_string()))?;
        Ok(role.into())
    }

    async fn set_role_position(
        &self,
        community: &CommunityId,
        role: &RoleId,
        position: u32,
    ) -> Result<(), PlatformError> {
        let body = serde_json::json!([{ "id": role, "position": position }]);
        self.send(
            Method::PATCH,
            &format!("/guilds/{community}/roles"),
            Some(&body),
            &format!("role {role}"),
        )
        .await?;
        Ok(())
    }

    async fn member_roles(
        &self,
        community: &CommunityId,
        user: &PlatformUserId,
    ) -> Result<Option<Vec<RoleId>>, PlatformError> {
        let result = self
            .send(
                Method::GET,
                &format!("/guilds/{community}/members/{user}"),
                None,
                &format!("member {user}"),
            )
            .await;
        let response = match result {
            Ok(r) => r,
            Err(PlatformError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        let member: WireMember = response
            .json()
            .await
            .map_err(|e| PlatformError::InvalidResponse(e.to_string()))?;
        Ok(Some(member.roles.into_iter().map(RoleId::new).collect()))
    }

    async fn add_member_role(
        &self,
        community: &CommunityId,
        user: &PlatformUserId,
        role: &RoleId,
    ) -> Result<(), PlatformError> {
        self.send(
            Method::PUT,
            &format!("/guilds/{community}/members/{user}/roles/{role}"),
            None,
            &format!("member {user} or role {role}"),
        )
        .await?;
        Ok(())
    }

    async fn remove_member_role(
        &self,
        community: &CommunityId,
        user: &PlatformUserId,
        role: &RoleId,
    ) -> Result<(), PlatformError> {
        self.send(
            Method::DELETE,
            &format!("/guilds/{community}/members/{user}/roles/{role}"),
            None,
            &format!("member {user} or role {role}"),
        )
        .await?;
        Ok(())
    }

    async fn send_message(
        &self,
        channel: &ChannelId,
        message: &OutgoingMessage,
    ) -> Result<(), PlatformError> {
        self.send(
            Method::POST,
            &format!("/channels/{channel}/messages"),
            Some(&message.to_json()),
            &format!("channel {channel}"),
        )
        .await?;
        Ok(())
    }

    async fn edit_interaction_reply(
        &self,
        interaction_token: &str,
        message: &OutgoingMessage,
    ) -> Result<(), PlatformError> {
        self.send(
            Method::PATCH,
            &format!(
                "/webhooks/{}/{interaction_token}/messages/@original",
                self.application_id
            ),
            Some(&message.to_json()),
            "interaction",
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_role_conversion() {
        let json = r#"{"id": "55", "name": "Senator", "color": 3447003, "position": 4, "hoist": false}"#;
        let role: Role = serde_json::from_str::<WireRole>(json).unwrap().into();
        assert_eq!(role.id, RoleId::new("55"));
        assert_eq!(role.color.value(), 3447003);
        assert_eq!(role.position, 4);
    }

    #[test]
    fn wire_member_without_roles() {
        let member: WireMember = serde_json::from_str(r#"{"user": {"id": "1"}}"#).unwrap();
        assert!(member.roles.is_empty());
    }
}
