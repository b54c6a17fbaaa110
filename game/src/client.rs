//! HTTP client for the game's bot API.

use crate::error::GameError;
use crate::types::{game_state_from_wire, GameParty, GameState, GameUser, WireOffice, WireParty, WireUser};

use async_trait::async_trait;
use reqwest::StatusCode;
use senatus_types::{ExternalAccountId, PartyId};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default timeout for game API requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Public production endpoint.
pub const DEFAULT_BASE_URL: &str = "https://democracyonline.io/api";

/// Read-only view of the external game.
#[async_trait]
pub trait GameClient: Send + Sync {
    async fn fetch_user(&self, id: &ExternalAccountId) -> Result<GameUser, GameError>;

    async fn fetch_party(&self, id: &PartyId) -> Result<GameParty, GameError>;

    async fn fetch_game_state(&self) -> Result<GameState, GameError>;
}

/// Client for the game's `bot` endpoint family.
///
/// Sends `GET {base}/bot?endpoint=<name>&id=<id>` and parses the JSON body.
pub struct HttpGameClient {
    base_url: String,
    /// HTTP client (reusable connection pool).
    http_client: reqwest::Client,
}

impl HttpGameClient {
    /// Create a client with default timeout settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET {base}/bot?endpoint=...` decoded as `T`.
    ///
    /// `what` names the record for [`GameError::NotFound`] messages.
    async fn get_bot_endpoint<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        id: Option<&str>,
        what: &str,
    ) -> Result<T, GameError> {
        let url = format!("{}/bot", self.base_url);
        let mut query: Vec<(&str, &str)> = vec![("endpoint", endpoint)];
        if let Some(id) = id {
            query.push(("id", id));
        }

        let response = self
            .http_client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GameError::Unreachable(format!("request timed out: {e}"))
                } else if e.is_connect() {
                    GameError::Unreachable(format!("connection failed: {e}"))
                } else {
                    GameError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(GameError::NotFound(what.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(endpoint, %status, body = %body, "game API returned an error status");
            return Err(GameError::RequestFailed(format!("HTTP status {status}")));
        }

        response.json::<T>().await.map_err(|e| {
            GameError::InvalidResponse(format!("failed to parse {endpoint} response: {e}"))
        })
    }
}

#[async_trait]
impl GameClient for HttpGameClient {
    async fn fetch_user(&self, id: &ExternalAccountId) -> Result<GameUser, GameError> {
        let wire: WireUser = self
            .get_bot_endpoint("users", Some(id.as_str()), &format!("user {id}"))
            .await?;
        Ok(wire.into())
    }

    async fn fetch_party(&self, id: &PartyId) -> Result<GameParty, GameError> {
        let wire: WireParty = self
            .get_bot_endpoint("parties", Some(id.as_str()), &format!("party {id}"))
            .await?;
        Ok(wire.into_party(id))
    }

    async fn fetch_game_state(&self) -> Result<GameState, GameError> {
        let offices: Vec<WireOffice> = self
            .get_bot_endpoint("game-state", None, "game state")
            .await?;
        game_state_from_wire(offices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation_trims_trailing_slash() {
        let client = HttpGameClient::new("https://example.test/api/");
        assert_eq!(client.base_url(), "https://example.test/api");
    }

    #[test]
    fn client_with_timeout() {
        let client = HttpGameClient::with_timeout(DEFAULT_BASE_URL, Duration::from_secs(5));
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
    }
}
