//! In-memory adapters for embedding and tests.

use std::collections::BTreeMap;
use std::sync::RwLock;

use heroforge_domain::{ApLedger, CharacterId, CharacterSnapshot};

use crate::infrastructure::ports::{ApCacheStore, CacheError, CharacterStatePort};

/// Cache store that keeps the last saved map in memory.
#[derive(Default)]
pub struct InMemoryApCacheStore {
    ledgers: RwLock<BTreeMap<CharacterId, ApLedger>>,
}

impl InMemoryApCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ledgers(ledgers: BTreeMap<CharacterId, ApLedger>) -> Self {
        Self {
            ledgers: RwLock::new(ledgers),
        }
    }

    pub fn snapshot(&self) -> BTreeMap<CharacterId, ApLedger> {
        self.ledgers
            .read()
            .map(|ledgers| ledgers.clone())
            .unwrap_or_default()
    }
}

impl ApCacheStore for InMemoryApCacheStore {
    fn load(&self) -> Result<BTreeMap<CharacterId, ApLedger>, CacheError> {
        self.ledgers
            .read()
            .map(|ledgers| ledgers.clone())
            .map_err(|e| CacheError::read("memory", e))
    }

    fn save(&self, ledgers: &BTreeMap<CharacterId, ApLedger>) -> Result<(), CacheError> {
        let mut stored = self
            .ledgers
            .write()
            .map_err(|e| CacheError::write("memory", e))?;
        *stored = ledgers.clone();
        Ok(())
    }
}

/// Character state held in memory, committed by the caller.
#[derive(Default)]
pub struct InMemoryCharacterStore {
    characters: RwLock<BTreeMap<CharacterId, CharacterSnapshot>>,
}

impl InMemoryCharacterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_characters(characters: impl IntoIterator<Item = CharacterSnapshot>) -> Self {
        let store = Self::new();
        for character in characters {
            store.commit(character);
        }
        store
    }

    /// Stores `character`, replacing any earlier snapshot with its id.
    pub fn commit(&self, character: CharacterSnapshot) {
        if let Ok(mut characters) = self.characters.write() {
            characters.insert(character.id, character);
        }
    }

    pub fn remove(&self, id: CharacterId) -> Option<CharacterSnapshot> {
        self.characters
            .write()
            .ok()
            .and_then(|mut characters| characters.remove(&id))
    }
}

impl CharacterStatePort for InMemoryCharacterStore {
    fn get(&self, id: CharacterId) -> Option<CharacterSnapshot> {
        self.characters
            .read()
            .ok()
            .and_then(|characters| characters.get(&id).cloned())
    }

    fn list_ids(&self) -> Vec<CharacterId> {
        self.characters
            .read()
            .map(|characters| characters.keys().copied().collect())
            .unwrap_or_default()
    }
}
