//! Chat-side roles as seen by the reconciler.

use crate::error::TypesError;
use crate::ids::RoleId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 24-bit RGB colour. `0` means "platform default".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleColor(u32);

impl RoleColor {
    pub const DEFAULT: Self = Self(0);
    pub const BLUE: Self = Self(0x3498db);

    pub fn new(rgb: u32) -> Self {
        Self(rgb & 0x00ff_ffff)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// Parse a game colour, falling back to the platform default when malformed.
    pub fn from_hex_lossy(raw: &str) -> Self {
        raw.parse().unwrap_or(Self::DEFAULT)
    }
}

impl FromStr for RoleColor {
    type Err = TypesError;

    /// Accepts `#RRGGBB` or `RRGGBB`, any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 {
            return Err(TypesError::InvalidColor(s.to_string()));
        }
        u32::from_str_radix(hex, 16)
            .map(Self)
            .map_err(|_| TypesError::InvalidColor(s.to_string()))
    }
}

impl fmt::Display for RoleColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

/// A role that exists in a community.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub color: RoleColor,
    /// Rank in the community hierarchy; higher outranks lower, 0 is the base role.
    pub position: u32,
}

/// What to create.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSpec {
    pub name: String,
    pub color: RoleColor,
    pub mentionable: bool,
}

impl RoleSpec {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: RoleColor::DEFAULT,
            mentionable: false,
        }
    }

    pub fn with_color(mut self, color: RoleColor) -> Self {
        self.color = color;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_with_and_without_hash() {
        assert_eq!("#ff0000".parse::<RoleColor>().unwrap().value(), 0xff0000);
        assert_eq!("00FF7f".parse::<RoleColor>().unwrap().value(), 0x00ff7f);
    }

    #[test]
    fn rejects_malformed() {
        assert!("#fff".parse::<RoleColor>().is_err());
        assert!("zzzzzz".parse::<RoleColor>().is_err());
        assert_eq!(RoleColor::from_hex_lossy("red"), RoleColor::DEFAULT);
    }

    #[test]
    fn display_roundtrips_through_parse() {
        let c = RoleColor::new(0x0a0b0c);
        assert_eq!(c.to_string(), "#0a0b0c");
        assert_eq!(c.to_string().parse::<RoleColor>().unwrap(), c);
    }
}
