//! Bot configuration with TOML file support.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use senatus_utils::{parse_daily_time, LogFormat};

use crate::BotError;

/// Configuration for a senatus bot.
///
/// Can be loaded from a TOML file via [`BotConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Every field has a default.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BotConfig {
    /// Base URL of the game API; `/bot?endpoint=...` is appended.
    #[serde(default = "default_game_api_base")]
    pub game_api_base: String,

    /// Discord REST base URL.
    #[serde(default = "default_discord_api_base")]
    pub discord_api_base: String,

    /// Chat identities allowed to run admin commands.
    #[serde(default)]
    pub admins: Vec<String>,

    /// Daily broadcast time, `HH:MM` in UTC.
    #[serde(default = "default_broadcast_time")]
    pub broadcast_time: String,

    /// Strip party and job roles when a link is deleted.
    #[serde(default)]
    pub revoke_roles_on_unlink: bool,

    /// Address the interactions endpoint listens on.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Data directory for the account store.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Timeout for game API requests.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Game name used in replies.
    #[serde(default = "default_game_name")]
    pub game_name: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_game_api_base() -> String {
    senatus_game::client::DEFAULT_BASE_URL.to_string()
}

fn default_discord_api_base() -> String {
    senatus_platform::discord::DEFAULT_API_BASE.to_string()
}

fn default_broadcast_time() -> String {
    "12:00".to_string()
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./senatus_data")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_game_name() -> String {
    "DemocracyOnline".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl BotConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, BotError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| BotError::Config(format!("{path}: {e}")))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, BotError> {
        let config: Self = toml::from_str(s).map_err(|e| BotError::Config(e.to_string()))?;
        config.broadcast_at()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, BotError> {
        toml::to_string_pretty(self).map_err(|e| BotError::Config(e.to_string()))
    }

    /// The parsed daily broadcast time.
    pub fn broadcast_at(&self) -> Result<NaiveTime, BotError> {
        parse_daily_time(&self.broadcast_time).ok_or_else(|| {
            BotError::Config(format!(
                "broadcast_time '{}' is not HH:MM",
                self.broadcast_time
            ))
        })
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            game_api_base: default_game_api_base(),
            discord_api_base: default_discord_api_base(),
            admins: Vec::new(),
            broadcast_time: default_broadcast_time(),
            revoke_roles_on_unlink: false,
            listen_addr: default_listen_addr(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            request_timeout_secs: default_request_timeout_secs(),
            game_name: default_game_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = BotConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = BotConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.listen_addr, config.listen_addr);
        assert_eq!(parsed.broadcast_time, config.broadcast_time);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = BotConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.game_api_base, "https://democracyonline.io/api");
        assert!(config.admins.is_empty());
        assert!(!config.revoke_roles_on_unlink);
        assert_eq!(config.log_format, LogFormat::Human);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            admins = ["111", "222"]
            broadcast_time = "18:30"
            revoke_roles_on_unlink = true
            log_format = "json"
        "#;
        let config = BotConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.admins, vec!["111", "222"]);
        assert_eq!(
            config.broadcast_at().unwrap(),
            NaiveTime::from_hms_opt(18, 30, 0).unwrap()
        );
        assert!(config.revoke_roles_on_unlink);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn bad_broadcast_time_is_rejected() {
        let err = BotConfig::from_toml_str(r#"broadcast_time = "noon""#).unwrap_err();
        assert!(matches!(err, BotError::Config(_)));
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = BotConfig::from_toml_file("/nonexistent/senatus.toml");
        assert!(matches!(result, Err(BotError::Config(_))));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("senatus.toml");
        std::fs::write(&path, "game_name = \"TestGame\"\nlisten_addr = \"0.0.0.0:9000\"\n").unwrap();
        let config = BotConfig::from_toml_file(path.to_str().unwrap()).unwrap();
        assert_eq!(config.game_name, "TestGame");
        assert_eq!(config.listen_addr, "0.0.0.0:9000");
    }
}
