//! Game records and their JSON wire shapes.

use serde::{Deserialize, Serialize};

use senatus_types::{ExternalAccountId, JobTitle, PartyId, RoleColor};

use crate::error::GameError;
use crate::status::{describe_election, Office};

/// A user profile in the game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameUser {
    pub id: ExternalAccountId,
    pub username: String,
    /// Free text edited by the user; empty when unset.
    pub bio: String,
    pub party_id: Option<PartyId>,
    /// Raw job field as reported by the game.
    pub job: Option<String>,
    pub created_at: String,
}

impl GameUser {
    /// The elected office this user holds, if it is one we mirror as a role.
    pub fn job_title(&self) -> Option<JobTitle> {
        JobTitle::from_game_field(self.job.as_deref())
    }
}

/// A party's display metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameParty {
    pub id: PartyId,
    pub name: String,
    /// Hex string such as `"#1f8b4c"`.
    pub color: String,
}

impl GameParty {
    pub fn role_color(&self) -> RoleColor {
        RoleColor::from_hex_lossy(&self.color)
    }
}

/// Summary of the elections and the bills currently being voted on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub president_status: String,
    pub senate_status: String,
    pub president_bills: Vec<String>,
    pub senate_bills: Vec<String>,
    pub house_bills: Vec<String>,
}

// ── Wire shapes ─────────────────────────────────────────────────────────

/// Ids come back as JSON numbers on some endpoints and strings on others.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum WireId {
    Num(i64),
    Str(String),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            WireId::Num(n) => n.to_string(),
            WireId::Str(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireUser {
    pub id: WireId,
    pub username: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub party_id: Option<WireId>,
    #[serde(default, alias = "role")]
    pub job: Option<String>,
    #[serde(default)]
    pub created_at: Option<serde_json::Value>,
}

impl From<WireUser> for GameUser {
    fn from(w: WireUser) -> Self {
        let party_id = w
            .party_id
            .map(WireId::into_string)
            .filter(|s| !s.is_empty())
            .map(PartyId::new);
        let created_at = match w.created_at {
            Some(serde_json::Value::String(s)) => s,
            Some(serde_json::Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        GameUser {
            id: ExternalAccountId::new(w.id.into_string()),
            username: w.username,
            bio: w.bio.unwrap_or_default(),
            party_id,
            job: w.job.filter(|j| !j.trim().is_empty()),
            created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireParty {
    #[serde(default)]
    pub id: Option<WireId>,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl WireParty {
    pub(crate) fn into_party(self, requested: &PartyId) -> GameParty {
        GameParty {
            id: self
                .id
                .map(|i| PartyId::new(i.into_string()))
                .unwrap_or_else(|| requested.clone()),
            name: self.name,
            color: self.color.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireOffice {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "daysLeft")]
    pub days_left: Option<i64>,
    #[serde(default)]
    pub bills_voting: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub house_bills_voting: Option<Vec<serde_json::Value>>,
}

/// Bills arrive either as preformatted strings or as `{id, title}` objects.
fn render_bill(bill: &serde_json::Value) -> String {
    match bill {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Object(map) => {
            let id = map.get("id").map(plain).unwrap_or_default();
            let title = map.get("title").map(plain).unwrap_or_default();
            format!("#{id} - {title}")
        }
        other => other.to_string(),
    }
}

fn plain(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn render_bills(bills: Option<Vec<serde_json::Value>>) -> Vec<String> {
    bills
        .unwrap_or_default()
        .iter()
        .map(render_bill)
        .collect()
}

/// The game-state endpoint returns `[president_record, senate_record]`.
pub(crate) fn game_state_from_wire(offices: Vec<WireOffice>) -> Result<GameState, GameError> {
    let mut iter = offices.into_iter();
    let (Some(president), Some(senate)) = (iter.next(), iter.next()) else {
        return Err(GameError::InvalidResponse(
            "game state must contain president and senate records".into(),
        ));
    };

    Ok(GameState {
        president_status: describe_election(
            Office::President,
            president.status.as_deref().unwrap_or("Unknown"),
            president.days_left.unwrap_or(0),
        ),
        senate_status: describe_election(
            Office::Senate,
            senate.status.as_deref().unwrap_or("Unknown"),
            senate.days_left.unwrap_or(0),
        ),
        president_bills: render_bills(president.bills_voting),
        senate_bills: render_bills(senate.bills_voting),
        house_bills: render_bills(senate.house_bills_voting),
    })
}

/// Decode a raw `users` response body.
pub fn decode_user(body: &[u8]) -> Result<GameUser, GameError> {
    serde_json::from_slice::<WireUser>(body)
        .map(GameUser::from)
        .map_err(|e| GameError::InvalidResponse(format!("failed to parse users response: {e}")))
}

/// Decode a raw `game-state` response body.
pub fn decode_game_state(body: &[u8]) -> Result<GameState, GameError> {
    let offices: Vec<WireOffice> = serde_json::from_slice(body).map_err(|e| {
        GameError::InvalidResponse(format!("failed to parse game-state response: {e}"))
    })?;
    game_state_from_wire(offices)
}
