//! Nullable infrastructure for deterministic testing.
//!
//! Every external dependency (storage, game API, chat platform, randomness)
//! is abstracted behind a trait. This crate provides test-friendly
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod game;
pub mod platform;
pub mod random;
pub mod store;

pub use game::NullGameClient;
pub use platform::NullPlatform;
pub use random::NullRandom;
pub use store::NullStore;
