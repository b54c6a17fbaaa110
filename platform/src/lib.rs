//! Chat platform access.
//!
//! The reconciler, the command surface and the broadcaster only talk to the
//! chat platform through [`ChatPlatform`]. [`DiscordClient`] implements it on
//! top of the Discord REST API (v10).

pub mod discord;
pub mod error;
pub mod message;
pub mod platform;

pub use discord::DiscordClient;
pub use error::PlatformError;
pub use message::{Embed, EmbedField, OutgoingMessage};
pub use platform::ChatPlatform;
