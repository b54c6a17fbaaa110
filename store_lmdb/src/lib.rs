//! LMDB storage backend for senatus.
//!
//! Implements the storage traits from `senatus-store` using the `heed` LMDB
//! bindings. Each logical table maps to one LMDB database within a single
//! environment; values are bincode-encoded.

pub mod account;
pub mod environment;
pub mod error;
pub mod integrity;
pub mod party_role;

pub use account::LmdbAccountStore;
pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use party_role::LmdbPartyRoleStore;
