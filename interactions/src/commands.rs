//! Slash-command definitions registered with Discord.

use serde_json::{json, Value};

const OPTION_STRING: u8 = 3;
const OPTION_BOOLEAN: u8 = 5;
const OPTION_USER: u8 = 6;
const OPTION_ROLE: u8 = 8;

/// The bulk-overwrite payload for every command the endpoint understands.
pub fn command_definitions() -> Value {
    json!([
        {
            "name": "verify",
            "description": "Link your game account via a verification code in your bio",
            "options": [option(OPTION_STRING, "user_id", "Your game user id", true)],
        },
        {
            "name": "whoami",
            "description": "Show your linked game account",
        },
        {
            "name": "deletelink",
            "description": "Remove a link to a game account",
            "options": [option(OPTION_USER, "user", "Member whose link to remove (admins only)", false)],
        },
        {
            "name": "forceverify",
            "description": "Link a member to a game account without a code (admins only)",
            "options": [
                option(OPTION_USER, "user", "Member to link", true),
                option(OPTION_STRING, "user_id", "Game user id", true),
            ],
        },
        {
            "name": "processpartyroles",
            "description": "Assign party roles to every verified member",
        },
        {
            "name": "processjobroles",
            "description": "Assign job roles to every verified member",
        },
        {
            "name": "gameupdate",
            "description": "Post the daily game update in this channel (admins only)",
            "options": [
                option(OPTION_ROLE, "role_to_ping", "Role to mention with each update", false),
                option(OPTION_BOOLEAN, "ping_on_first_run", "Mention the role on the first post too", false),
            ],
        },
    ])
}

fn option(kind: u8, name: &str, description: &str, required: bool) -> Value {
    json!({
        "type": kind,
        "name": name,
        "description": description,
        "required": required,
    })
}
