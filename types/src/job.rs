//! Elected job titles mirrored as chat roles.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of elected offices that get a chat role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobTitle {
    Representative,
    Senator,
    President,
}

impl JobTitle {
    pub const ALL: [JobTitle; 3] = [Self::Representative, Self::Senator, Self::President];

    /// Exact role name used in every community.
    pub fn role_name(&self) -> &'static str {
        match self {
            Self::Representative => "Representative",
            Self::Senator => "Senator",
            Self::President => "President",
        }
    }

    /// Parse the game's free-form job field; anything outside the closed set is `None`.
    pub fn from_game_field(raw: Option<&str>) -> Option<Self> {
        raw.and_then(|s| s.parse().ok())
    }
}

impl FromStr for JobTitle {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "representative" => Ok(Self::Representative),
            "senator" => Ok(Self::Senator),
            "president" => Ok(Self::President),
            _ => Err(TypesError::UnknownJob(s.to_string())),
        }
    }
}

impl fmt::Display for JobTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.role_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("senator".parse::<JobTitle>(), Ok(JobTitle::Senator));
        assert_eq!(" PRESIDENT ".parse::<JobTitle>(), Ok(JobTitle::President));
        assert!("Citizen".parse::<JobTitle>().is_err());
    }

    #[test]
    fn game_field_absent_or_unknown_is_none() {
        assert_eq!(JobTitle::from_game_field(None), None);
        assert_eq!(JobTitle::from_game_field(Some("")), None);
        assert_eq!(JobTitle::from_game_field(Some("Governor")), None);
        assert_eq!(
            JobTitle::from_game_field(Some("Representative")),
            Some(JobTitle::Representative)
        );
    }

    #[test]
    fn role_names_are_distinct() {
        let names: std::collections::HashSet<_> =
            JobTitle::ALL.iter().map(|j| j.role_name()).collect();
        assert_eq!(names.len(), 3);
    }
}
