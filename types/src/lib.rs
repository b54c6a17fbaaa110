//! Fundamental types for senatus.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! chat-platform and game identifiers, linked accounts, party-role bindings,
//! job titles, role colours and verification codes.

pub mod account;
pub mod code;
pub mod error;
pub mod ids;
pub mod job;
pub mod role;
pub mod state;

pub use account::{LinkedAccount, PartyRoleBinding};
pub use code::{CodeSource, VerificationCode};
pub use error::TypesError;
pub use ids::{
    ChannelId, CommunityId, ExternalAccountId, InternalId, PartyId, PlatformUserId, RoleId,
};
pub use job::JobTitle;
pub use role::{Role, RoleColor, RoleSpec};
pub use state::LinkState;
