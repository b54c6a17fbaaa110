//! Results of engine operations that are not failures.

use senatus_types::{LinkedAccount, VerificationCode};

/// Result of a `verify` request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// A fresh code was stored; the user must put it in their bio.
    CodeIssued {
        code: VerificationCode,
        account: LinkedAccount,
    },
    /// The outstanding code was found in the bio.
    VerifiedNow(LinkedAccount),
    /// Nothing to do; the store was not touched.
    AlreadyVerified(LinkedAccount),
}

impl VerifyOutcome {
    pub fn account(&self) -> &LinkedAccount {
        match self {
            Self::CodeIssued { account, .. } => account,
            Self::VerifiedNow(account) | Self::AlreadyVerified(account) => account,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ForceVerifyOutcome {
    Verified(LinkedAccount),
    /// Already verified for the same game account; nothing written.
    AlreadyVerified(LinkedAccount),
}

impl ForceVerifyOutcome {
    pub fn account(&self) -> &LinkedAccount {
        match self {
            Self::Verified(account) | Self::AlreadyVerified(account) => account,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnlinkOutcome {
    /// The deleted record.
    Removed(LinkedAccount),
    NotLinked,
}

/// What `whoami` sees.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccountStatus {
    NotLinked,
    Pending(LinkedAccount),
    Verified(LinkedAccount),
}
