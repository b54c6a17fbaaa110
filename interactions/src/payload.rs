//! Incoming interaction payloads.

use serde::Deserialize;
use serde_json::Value;

use senatus_bot::{Command, Invocation};
use senatus_types::{ChannelId, CommunityId, ExternalAccountId, PlatformUserId, RoleId};

use crate::error::InteractionError;

const TYPE_PING: u8 = 1;
const TYPE_APPLICATION_COMMAND: u8 = 2;

#[derive(Debug, Deserialize)]
struct WireInteraction {
    #[serde(rename = "type")]
    kind: u8,
    #[serde(default)]
    token: String,
    guild_id: Option<String>,
    channel_id: Option<String>,
    member: Option<WireMember>,
    user: Option<WireUser>,
    data: Option<WireCommandData>,
}

#[derive(Debug, Deserialize)]
struct WireMember {
    user: WireUser,
}

#[derive(Debug, Deserialize)]
struct WireUser {
    id: String,
    #[serde(default)]
    username: String,
    global_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireCommandData {
    name: String,
    #[serde(default)]
    options: Vec<WireOption>,
}

#[derive(Debug, Deserialize)]
struct WireOption {
    name: String,
    #[serde(default)]
    value: Value,
}

/// What the endpoint has to do with a request.
#[derive(Debug, PartialEq, Eq)]
pub enum Interaction {
    Ping,
    /// A known command sent from inside a community.
    Command {
        token: String,
        invocation: Invocation,
    },
    /// A command the bot cannot run here; answer with `reason`.
    Rejected { reason: String },
    /// Component clicks, autocomplete and so on.
    Unsupported(u8),
}

/// Decode a verified request body.
pub fn parse_interaction(body: &[u8]) -> Result<Interaction, InteractionError> {
    let wire: WireInteraction =
        serde_json::from_slice(body).map_err(|e| InteractionError::Malformed(e.to_string()))?;

    match wire.kind {
        TYPE_PING => return Ok(Interaction::Ping),
        TYPE_APPLICATION_COMMAND => {}
        other => return Ok(Interaction::Unsupported(other)),
    }

    let data = wire
        .data
        .ok_or_else(|| InteractionError::Malformed("command without data".into()))?;

    let (Some(guild), Some(member)) = (wire.guild_id, wire.member) else {
        return Ok(Interaction::Rejected {
            reason: "This command can only be used in a server.".into(),
        });
    };
    let channel = wire.channel_id.unwrap_or_default();

    let Some(command) = parse_command(&data.name, &data.options)? else {
        return Ok(Interaction::Rejected {
            reason: format!("Unknown command `{}`.", data.name),
        });
    };

    let user = member.user;
    let invoker_name = user
        .global_name
        .filter(|n| !n.is_empty())
        .unwrap_or(user.username);
    Ok(Interaction::Command {
        token: wire.token,
        invocation: Invocation {
            community: CommunityId::new(guild),
            channel: ChannelId::new(channel),
            invoker: PlatformUserId::new(user.id),
            invoker_name,
            command,
        },
    })
}

fn parse_command(name: &str, options: &[WireOption]) -> Result<Option<Command>, InteractionError> {
    let command = match name {
        "verify" => Command::Verify {
            external_id: ExternalAccountId::new(required(options, "user_id")?),
        },
        "whoami" => Command::WhoAmI,
        "deletelink" => Command::DeleteLink {
            target: string_option(options, "user").map(PlatformUserId::new),
        },
        "forceverify" => Command::ForceVerify {
            user: PlatformUserId::new(required(options, "user")?),
            external_id: ExternalAccountId::new(required(options, "user_id")?),
        },
        "processpartyroles" => Command::ProcessPartyRoles,
        "processjobroles" => Command::ProcessJobRoles,
        "gameupdate" => Command::GameUpdate {
            ping_role: string_option(options, "role_to_ping").map(RoleId::new),
            ping_on_first_run: options
                .iter()
                .find(|o| o.name == "ping_on_first_run")
                .and_then(|o| o.value.as_bool())
                .unwrap_or(false),
        },
        _ => return Ok(None),
    };
    Ok(Some(command))
}

/// String, user and role options all carry their value as a JSON string;
/// numeric ids are accepted too.
fn string_option(options: &[WireOption], name: &str) -> Option<String> {
    let value = &options.iter().find(|o| o.name == name)?.value;
    let s = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}

fn required(options: &[WireOption], name: &str) -> Result<String, InteractionError> {
    string_option(options, name)
        .ok_or_else(|| InteractionError::Malformed(format!("missing option '{name}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(name: &str, options: Value) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "type": 2,
            "token": "tok",
            "guild_id": "100",
            "channel_id": "200",
            "member": {"user": {"id": "42", "username": "alice", "global_name": "Alice"}},
            "data": {"name": name, "options": options},
        }))
        .unwrap()
    }

    #[test]
    fn ping() {
        assert_eq!(parse_interaction(br#"{"type": 1}"#).unwrap(), Interaction::Ping);
    }

    #[test]
    fn verify_with_option() {
        let parsed = parse_interaction(&command(
            "verify",
            serde_json::json!([{"name": "user_id", "type": 3, "value": " 159 "}]),
        ))
        .unwrap();
        let Interaction::Command { token, invocation } = parsed else {
            panic!("expected a command");
        };
        assert_eq!(token, "tok");
        assert_eq!(invocation.community, CommunityId::new("100"));
        assert_eq!(invocation.channel, ChannelId::new("200"));
        assert_eq!(invocation.invoker_name, "Alice");
        assert_eq!(
            invocation.command,
            Command::Verify {
                external_id: ExternalAccountId::new("159")
            }
        );
    }

    #[test]
    fn gameupdate_options_default() {
        let Interaction::Command { invocation, .. } =
            parse_interaction(&command("gameupdate", serde_json::json!([]))).unwrap()
        else {
            panic!("expected a command");
        };
        assert_eq!(
            invocation.command,
            Command::GameUpdate {
                ping_role: None,
                ping_on_first_run: false
            }
        );
    }

    #[test]
    fn forceverify_needs_both_options() {
        let err = parse_interaction(&command(
            "forceverify",
            serde_json::json!([{"name": "user", "type": 6, "value": "7"}]),
        ))
        .unwrap_err();
        assert!(matches!(err, InteractionError::Malformed(_)));
    }

    #[test]
    fn direct_message_is_rejected() {
        let body = serde_json::to_vec(&serde_json::json!({
            "type": 2,
            "token": "tok",
            "user": {"id": "42", "username": "alice"},
            "data": {"name": "whoami"},
        }))
        .unwrap();
        assert!(matches!(
            parse_interaction(&body).unwrap(),
            Interaction::Rejected { .. }
        ));
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(matches!(
            parse_interaction(&command("hello", serde_json::json!([]))).unwrap(),
            Interaction::Rejected { .. }
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            parse_interaction(b"not json"),
            Err(InteractionError::Malformed(_))
        ));
    }
}
