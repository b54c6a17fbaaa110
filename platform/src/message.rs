//! Outgoing messages and embeds.
//!
//! Serialises directly to the Discord message JSON shape.

use serde::{Deserialize, Serialize};

use senatus_types::{RoleColor, RoleId};

/// Discord caps embed field values at 1024 characters.
pub const FIELD_VALUE_LIMIT: usize = 1024;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: u32,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub fields: Vec<EmbedField>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl Embed {
    pub fn new(title: impl Into<String>, color: RoleColor) -> Self {
        Self {
            title: title.into(),
            description: None,
            color: color.value(),
            fields: Vec::new(),
        }
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Add a labelled field; empty values become `"-"` and long ones are truncated.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        let value = value.into();
        let value = if value.trim().is_empty() {
            "-".to_string()
        } else {
            truncate(&value, FIELD_VALUE_LIMIT)
        };
        self.fields.push(EmbedField {
            name: name.into(),
            value,
            inline,
        });
        self
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

/// A message or interaction reply.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub content: Option<String>,
    pub embeds: Vec<Embed>,
    /// Roles this message may ping; every other mention is suppressed.
    pub ping_roles: Vec<RoleId>,
}

impl OutgoingMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn embed(embed: Embed) -> Self {
        Self {
            embeds: vec![embed],
            ..Default::default()
        }
    }

    /// Discord JSON body.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "content": self.content.clone().unwrap_or_default(),
            "embeds": self.embeds,
            "allowed_mentions": {
                "parse": [],
                "roles": self.ping_roles,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_field_value_is_dash() {
        let embed = Embed::new("t", RoleColor::BLUE).field("Bio", "  ", false);
        assert_eq!(embed.fields[0].value, "-");
    }

    #[test]
    fn long_field_is_truncated() {
        let long = "x".repeat(FIELD_VALUE_LIMIT + 50);
        let embed = Embed::new("t", RoleColor::BLUE).field("Bills", long, false);
        assert_eq!(embed.fields[0].value.chars().count(), FIELD_VALUE_LIMIT);
        assert!(embed.fields[0].value.ends_with('…'));
    }

    #[test]
    fn json_suppresses_unlisted_mentions() {
        let mut msg = OutgoingMessage::text("hello <@&1>");
        msg.ping_roles.push(RoleId::new("2"));
        let json = msg.to_json();
        assert_eq!(json["content"], "hello <@&1>");
        assert_eq!(json["allowed_mentions"]["parse"], serde_json::json!([]));
        assert_eq!(json["allowed_mentions"]["roles"], serde_json::json!(["2"]));
    }

    #[test]
    fn embed_json_shape() {
        let msg = OutgoingMessage::embed(
            Embed::new("Account", RoleColor::BLUE).field("Username", "alice", false),
        );
        let json = msg.to_json();
        assert_eq!(json["embeds"][0]["title"], "Account");
        assert_eq!(json["embeds"][0]["color"], 0x3498db);
        assert_eq!(json["embeds"][0]["fields"][0]["inline"], false);
    }
}
