//! Per-member and bulk reconciliation results.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The game account could not be fetched.
    LookupFailed,
    NoParty,
    NoJob,
    /// The target role could not be resolved or created.
    RoleUnavailable,
    /// The chat identity is not in the community.
    NotMember,
    /// The platform refused to read or change the member's roles.
    PlatformFailed,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LookupFailed => "game lookup failed",
            Self::NoParty => "no party",
            Self::NoJob => "no job",
            Self::RoleUnavailable => "role unavailable",
            Self::NotMember => "not a member",
            Self::PlatformFailed => "platform error",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignOutcome {
    /// Roles were granted or revoked.
    Assigned,
    /// The member already held exactly the right role.
    Unchanged,
    Skipped(SkipReason),
}

/// Aggregate counts from a bulk run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BulkReport {
    pub processed: usize,
    pub assigned: usize,
    pub unchanged: usize,
    pub skipped: usize,
}

impl BulkReport {
    pub fn record(&mut self, outcome: AssignOutcome) {
        self.processed += 1;
        match outcome {
            AssignOutcome::Assigned => self.assigned += 1,
            AssignOutcome::Unchanged => self.unchanged += 1,
            AssignOutcome::Skipped(_) => self.skipped += 1,
        }
    }
}

impl fmt::Display for BulkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} processed, {} assigned, {} unchanged, {} skipped",
            self.processed, self.assigned, self.unchanged, self.skipped
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_counts_each_outcome() {
        let mut report = BulkReport::default();
        report.record(AssignOutcome::Assigned);
        report.record(AssignOutcome::Assigned);
        report.record(AssignOutcome::Unchanged);
        report.record(AssignOutcome::Skipped(SkipReason::NoParty));
        assert_eq!(
            report,
            BulkReport {
                processed: 4,
                assigned: 2,
                unchanged: 1,
                skipped: 1
            }
        );
        assert_eq!(
            report.to_string(),
            "4 processed, 2 assigned, 1 unchanged, 1 skipped"
        );
    }
}
