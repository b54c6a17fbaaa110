//! Abstract storage traits for senatus.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the codebase depends only on the traits.

pub mod account;
pub mod error;
pub mod party_role;

pub use account::AccountStore;
pub use error::StoreError;
pub use party_role::PartyRoleStore;
