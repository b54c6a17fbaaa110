//! Discord interactions endpoint.
//!
//! Receives signed slash-command requests over HTTP, turns them into bot
//! [`Invocation`](senatus_bot::Invocation)s and delivers the replies as
//! deferred interaction responses.

pub mod commands;
pub mod error;
pub mod payload;
pub mod server;
pub mod signature;

pub use commands::command_definitions;
pub use error::InteractionError;
pub use payload::{parse_interaction, Interaction};
pub use server::{router, serve, InteractionState};
pub use signature::SignatureVerifier;
