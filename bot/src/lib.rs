//! The bot's command surface.
//!
//! Wires the verification engine and the role reconciler to the seven bot
//! commands, formats replies, runs the daily game-update broadcasts and
//! holds the bot configuration.

pub mod broadcaster;
pub mod commands;
pub mod config;
pub mod error;
pub mod reply;
pub mod shutdown;

pub use broadcaster::{BroadcastRegistry, Broadcaster};
pub use commands::{Command, CommandHandler, HandlerSettings, Invocation};
pub use config::BotConfig;
pub use error::BotError;
pub use reply::Reply;
pub use shutdown::ShutdownController;
