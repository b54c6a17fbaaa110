//! Role reconciliation.
//!
//! Maps two game attributes onto chat roles:
//! - **Party**: one role per party per community, created on demand from the
//!   party's name and colour and cached as a [`PartyRoleBinding`](senatus_types::PartyRoleBinding).
//! - **Job**: the three fixed elected-office roles, created together the first
//!   time any of them is needed.
//!
//! Within each category a member holds at most one role. Every assignment is
//! idempotent; a cached party role deleted out of band is recreated on the
//! next assignment.

pub mod error;
pub mod outcome;
pub mod reconciler;

pub use error::RoleError;
pub use outcome::{AssignOutcome, BulkReport, SkipReason};
pub use reconciler::RoleReconciler;
