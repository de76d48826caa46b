// Port traits define the full contract - many methods are for future use
#![allow(dead_code)]

//! Storage port traits: the AP cache and the character state owner.

use std::collections::BTreeMap;

use heroforge_domain::{ApLedger, CharacterId, CharacterSnapshot};

use super::error::CacheError;

// =============================================================================
// AP Cache Storage
// =============================================================================

/// Whole-map persistence for cached ledgers.
///
/// `save` replaces the stored map; a failed save must leave the previous
/// contents readable.
#[cfg_attr(test, mockall::automock)]
pub trait ApCacheStore: Send + Sync {
    fn load(&self) -> Result<BTreeMap<CharacterId, ApLedger>, CacheError>;
    fn save(&self, ledgers: &BTreeMap<CharacterId, ApLedger>) -> Result<(), CacheError>;
}

// =============================================================================
// Character State
// =============================================================================

/// Read access to committed character snapshots.
///
/// The owner of character state lives outside this crate; use cases hand
/// back updated snapshots for it to commit.
#[cfg_attr(test, mockall::automock)]
pub trait CharacterStatePort: Send + Sync {
    fn get(&self, id: CharacterId) -> Option<CharacterSnapshot>;
    fn list_ids(&self) -> Vec<CharacterId>;
}
