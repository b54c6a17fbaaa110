//! Game client: read-only access to the external game's web API.
//!
//! Design:
//! - Every endpoint lives under `GET {base}/bot?endpoint=<name>[&id=<id>]`
//! - Each fetch returns a structured record or a single [`GameError`];
//!   transport failures, non-2xx statuses and undecodable bodies all map to it
//! - [`GameClient`] is the seam; [`HttpGameClient`] is the production implementation

pub mod client;
pub mod error;
pub mod status;
pub mod types;

pub use client::{GameClient, HttpGameClient};
pub use error::GameError;
pub use status::{describe_election, Office};
pub use types::{decode_game_state, decode_user, GameParty, GameState, GameUser};
