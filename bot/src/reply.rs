//! Command replies and the structured summaries they carry.

use senatus_game::{GameState, GameUser};
use senatus_platform::{Embed, OutgoingMessage};
use senatus_types::{RoleColor, RoleId};

/// Accent colour of the daily game update.
pub const GAME_UPDATE_COLOR: RoleColor = RoleColor::BLUE;

/// One reply to one command: text, optionally with a summary embed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub embed: Option<Embed>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            embed: None,
        }
    }

    pub fn embed(embed: Embed) -> Self {
        Self {
            text: String::new(),
            embed: Some(embed),
        }
    }

    pub fn into_message(self) -> OutgoingMessage {
        OutgoingMessage {
            content: (!self.text.is_empty()).then_some(self.text),
            embeds: self.embed.into_iter().collect(),
            ping_roles: Vec::new(),
        }
    }
}

/// The `whoami` summary of a verified account.
pub fn account_embed(user: &GameUser, game_name: &str) -> Embed {
    Embed::new(format!("Your {game_name} Account Information"), RoleColor::BLUE)
        .field("Username", &user.username, false)
        .field("User ID", user.id.as_str(), false)
        .field("Bio", &user.bio, false)
        .field("Account Created", &user.created_at, false)
}

/// The daily game-state summary.
pub fn game_update_embed(state: &GameState, game_name: &str) -> Embed {
    Embed::new(format!("{game_name} Daily Update"), GAME_UPDATE_COLOR)
        .field("Presidential Election", &state.president_status, false)
        .field("Senate Election", &state.senate_status, false)
        .field("Bills Awaiting the President", bill_list(&state.president_bills), false)
        .field("Bills in the Senate", bill_list(&state.senate_bills), false)
        .field("Bills in the House", bill_list(&state.house_bills), false)
}

fn bill_list(bills: &[String]) -> String {
    if bills.is_empty() {
        return "No bills are currently being voted on.".to_string();
    }
    bills.join("\n")
}

/// The broadcast message, pinging `role` if given.
pub fn game_update_message(state: &GameState, game_name: &str, role: Option<&RoleId>) -> OutgoingMessage {
    let mut message = OutgoingMessage::embed(game_update_embed(state, game_name));
    if let Some(role) = role {
        message.content = Some(role.mention());
        message.ping_roles.push(role.clone());
    }
    message
}
