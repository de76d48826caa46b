//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - The AP cache store (could swap the JSON file for a database table)
//! - Character state (owned by whoever embeds the engine)
//! - Clock (for testing)

mod error;
mod repos;
mod testing;

pub use error::CacheError;
pub use repos::{ApCacheStore, CharacterStatePort};
pub use testing::ClockPort;

// Mock exports for tests
#[cfg(test)]
pub use repos::{MockApCacheStore, MockCharacterStatePort};
#[cfg(test)]
pub use testing::MockClockPort;
