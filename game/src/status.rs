//! Human-readable election status lines.

/// Which election a status line describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Office {
    President,
    Senate,
}

impl Office {
    fn election_name(&self) -> &'static str {
        match self {
            Office::President => "Presidential",
            Office::Senate => "Senate",
        }
    }

    fn lowercase_name(&self) -> &'static str {
        match self {
            Office::President => "presidential",
            Office::Senate => "senate",
        }
    }
}

/// Turn the game's raw election phase into a sentence.
///
/// Known phases are `Candidate`, `Voting` and `Concluded`; anything else is
/// passed through unchanged.
pub fn describe_election(office: Office, status: &str, days_left: i64) -> String {
    match status {
        "Candidate" => format!(
            "Nominations are open! Stand as a candidate now! {days_left} day(s) left until voting begins."
        ),
        "Voting" => format!(
            "{} elections are currently ongoing! {days_left} day(s) left until elections conclude.",
            office.election_name()
        ),
        "Concluded" => format!(
            "{} elections have concluded. {days_left} day(s) until the next {} elections.",
            office.election_name(),
            office.lowercase_name()
        ),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concluded_senate() {
        assert_eq!(
            describe_election(Office::Senate, "Concluded", 3),
            "Senate elections have concluded. 3 day(s) until the next senate elections."
        );
    }

    #[test]
    fn unknown_status_passes_through() {
        assert_eq!(describe_election(Office::President, "Paused", 1), "Paused");
    }
}
