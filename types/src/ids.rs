//! String-backed identifier newtypes.
//!
//! Chat-platform snowflakes and game ids arrive as decimal strings (or JSON
//! numbers that we normalise to strings). Keeping each kind in its own type
//! stops a community id from being passed where a role id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Return the raw identifier string.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// Opaque primary key of a linked account (random numeric string).
    InternalId
);
string_id!(
    /// A user's identifier on the chat platform.
    PlatformUserId
);
string_id!(
    /// A chat-platform community (a Discord guild).
    CommunityId
);
string_id!(
    /// A text channel inside a community.
    ChannelId
);
string_id!(
    /// A chat-side role.
    RoleId
);
string_id!(
    /// A user's account id in the external game.
    ExternalAccountId
);
string_id!(
    /// A party id in the external game.
    PartyId
);

impl RoleId {
    /// Mention syntax that pings every holder of the role.
    pub fn mention(&self) -> String {
        format!("<@&{}>", self.0)
    }
}

impl PlatformUserId {
    /// Mention syntax for a single user.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.0)
    }
}
