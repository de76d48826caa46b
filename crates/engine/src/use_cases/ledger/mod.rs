//! AP ledger cache.
//!
//! Ledgers are computed by the domain rules and kept per character until a
//! change to that character invalidates them. Ledgers read back from the
//! cache store are trusted as they are until the first invalidation.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use heroforge_domain::{compute_ledger, ApLedger, CharacterId, CharacterSnapshot, Diagnostic, RuleData};

use crate::infrastructure::ports::{ApCacheStore, CacheError, CharacterStatePort, ClockPort};

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Character not found: {0}")]
    UnknownCharacter(CharacterId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOrigin {
    /// Read from the cache store at startup
    Persisted,
    Computed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub ledger: ApLedger,
    pub origin: CacheOrigin,
    pub diagnostics: Vec<Diagnostic>,
    pub computed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidation {
    Character(CharacterId),
    All,
}

/// Outcome of writing the cache store. Failures never undo the change
/// that triggered the write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistStatus {
    Saved,
    Disabled,
    Failed(CacheError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loaded(usize),
    /// The store could not be read; the cache starts empty
    Failed(CacheError),
}

/// A freshly computed entry and whether it reached the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refresh {
    pub entry: CacheEntry,
    pub persist: PersistStatus,
}

pub struct LedgerService {
    rules: Arc<RuleData>,
    characters: Arc<dyn CharacterStatePort>,
    store: Arc<dyn ApCacheStore>,
    clock: Arc<dyn ClockPort>,
    entries: DashMap<CharacterId, CacheEntry>,
    persist_enabled: bool,
}

impl LedgerService {
    pub fn new(
        rules: Arc<RuleData>,
        characters: Arc<dyn CharacterStatePort>,
        store: Arc<dyn ApCacheStore>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            rules,
            characters,
            store,
            clock,
            entries: DashMap::new(),
            persist_enabled: true,
        }
    }

    pub fn with_persistence(mut self, enabled: bool) -> Self {
        self.persist_enabled = enabled;
        self
    }

    pub fn rules(&self) -> &RuleData {
        &self.rules
    }

    /// Ledger of a committed character, from the cache or freshly computed.
    pub fn ledger_for(&self, id: CharacterId) -> Result<ApLedger, LedgerError> {
        self.entry_for(id).map(|entry| entry.ledger)
    }

    pub fn entry_for(&self, id: CharacterId) -> Result<CacheEntry, LedgerError> {
        if let Some(entry) = self.cached(id) {
            tracing::debug!(character_id = %id, origin = ?entry.origin, "AP ledger cache hit");
            return Ok(entry);
        }
        let character = self
            .characters
            .get(id)
            .ok_or(LedgerError::UnknownCharacter(id))?;
        Ok(self.compute_and_store(&character))
    }

    /// Ledger of `character`, computed from the snapshot on a cache miss.
    ///
    /// The snapshot must be the committed state of its character.
    pub fn ledger_for_snapshot(&self, character: &CharacterSnapshot) -> ApLedger {
        match self.cached(character.id) {
            Some(entry) => entry.ledger,
            None => self.compute_and_store(character).ledger,
        }
    }

    pub fn cached(&self, id: CharacterId) -> Option<CacheEntry> {
        self.entries.get(&id).map(|entry| entry.value().clone())
    }

    /// Drops cached ledgers so the next read recomputes them.
    pub fn invalidate(&self, target: Invalidation) {
        match target {
            Invalidation::Character(id) => {
                if self.entries.remove(&id).is_some() {
                    tracing::debug!(character_id = %id, "AP ledger invalidated");
                }
            }
            Invalidation::All => {
                let count = self.entries.len();
                self.entries.clear();
                tracing::debug!(count, "All AP ledgers invalidated");
            }
        }
    }

    /// Replaces the cached ledger after a change to `character` and writes the store.
    pub fn refresh(&self, character: &CharacterSnapshot) -> Refresh {
        self.invalidate(Invalidation::Character(character.id));
        let entry = self.compute_and_store(character);
        let persist = self.persist();
        Refresh { entry, persist }
    }

    /// Forgets a deleted character, in memory and in the store.
    pub fn evict(&self, id: CharacterId) -> (Option<CacheEntry>, PersistStatus) {
        let removed = self.entries.remove(&id).map(|(_, entry)| entry);
        (removed, self.persist())
    }

    /// Seeds the cache from the store. Entries already computed are kept.
    pub fn load_persisted(&self) -> LoadStatus {
        match self.store.load() {
            Ok(ledgers) => {
                let now = self.clock.now();
                let count = ledgers.len();
                for (id, ledger) in ledgers {
                    self.entries.entry(id).or_insert_with(|| CacheEntry {
                        ledger,
                        origin: CacheOrigin::Persisted,
                        diagnostics: Vec::new(),
                        computed_at: now,
                    });
                }
                tracing::info!(count, "Loaded persisted AP ledgers");
                LoadStatus::Loaded(count)
            }
            Err(e) => {
                tracing::warn!(error = %e, "AP cache unreadable, starting empty");
                LoadStatus::Failed(e)
            }
        }
    }

    /// Writes every cached ledger to the store.
    pub fn persist(&self) -> PersistStatus {
        if !self.persist_enabled {
            return PersistStatus::Disabled;
        }
        let ledgers: BTreeMap<CharacterId, ApLedger> = self
            .entries
            .iter()
            .map(|entry| (*entry.key(), entry.value().ledger.clone()))
            .collect();
        match self.store.save(&ledgers) {
            Ok(()) => PersistStatus::Saved,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to persist AP cache");
                PersistStatus::Failed(e)
            }
        }
    }

    fn compute_and_store(&self, character: &CharacterSnapshot) -> CacheEntry {
        let computation = compute_ledger(&self.rules, character);
        for diagnostic in &computation.diagnostics {
            tracing::warn!(character_id = %character.id, %diagnostic, "AP ledger diagnostic");
        }
        let entry = CacheEntry {
            ledger: computation.ledger,
            origin: CacheOrigin::Computed,
            diagnostics: computation.diagnostics,
            computed_at: self.clock.now(),
        };
        tracing::debug!(
            character_id = %character.id,
            spent = entry.ledger.spent,
            available = ?entry.ledger.available,
            "AP ledger recomputed"
        );
        self.entries.insert(character.id, entry.clone());
        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::in_memory::{InMemoryApCacheStore, InMemoryCharacterStore};
    use crate::infrastructure::ports::{MockApCacheStore, MockCharacterStatePort, MockClockPort};
    use chrono::TimeZone;
    use heroforge_domain::{ActivatableCategory, ActivatableEntry, ActiveObject, ApCost};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).single().expect("valid time")
    }

    fn clock() -> Arc<dyn ClockPort> {
        let mut clock = MockClockPort::new();
        let now = fixed_now();
        clock.expect_now().returning(move || now);
        Arc::new(clock)
    }

    fn rules() -> Arc<RuleData> {
        Arc::new(
            RuleData::new()
                .with_attribute("ATTR_1", "Courage")
                .with_activatable(
                    ActivatableEntry::advantage("ADV_1", "Aptitude").with_cost(ApCost::Flat(10)),
                ),
        )
    }

    fn hero() -> CharacterSnapshot {
        CharacterSnapshot::new(CharacterId::new(), "Alrik", "EL_3")
            .with_total_ap(1100)
            .with_attribute("ATTR_1", 10)
    }

    #[test]
    fn ledger_for_computes_once_then_hits_the_cache() {
        let character = hero();
        let id = character.id;
        let mut characters = MockCharacterStatePort::new();
        characters
            .expect_get()
            .times(1)
            .returning(move |_| Some(character.clone()));
        let service = LedgerService::new(
            rules(),
            Arc::new(characters),
            Arc::new(InMemoryApCacheStore::new()),
            clock(),
        );

        let first = service.ledger_for(id).expect("ledger");
        let second = service.ledger_for(id).expect("ledger");

        assert_eq!(first, second);
        assert_eq!(first.spent_on_attributes, 30);
        assert_eq!(first.available, Some(1070));
        let entry = service.cached(id).expect("cached");
        assert_eq!(entry.origin, CacheOrigin::Computed);
        assert_eq!(entry.computed_at, fixed_now());
    }

    #[test]
    fn unknown_character_is_an_error() {
        let mut characters = MockCharacterStatePort::new();
        characters.expect_get().returning(|_| None);
        let service = LedgerService::new(
            rules(),
            Arc::new(characters),
            Arc::new(InMemoryApCacheStore::new()),
            clock(),
        );

        let err = service.ledger_for(CharacterId::new()).expect_err("must fail");
        assert!(matches!(err, LedgerError::UnknownCharacter(_)));
    }

    #[test]
    fn persisted_ledgers_are_trusted_until_invalidated() {
        let character = hero();
        let id = character.id;
        let stale = ApLedger::empty(Some(1));
        let store = InMemoryApCacheStore::with_ledgers(BTreeMap::from([(id, stale.clone())]));
        let characters = InMemoryCharacterStore::with_characters([character]);
        let service = LedgerService::new(rules(), Arc::new(characters), Arc::new(store), clock());

        assert_eq!(service.load_persisted(), LoadStatus::Loaded(1));
        assert_eq!(service.ledger_for(id).expect("ledger"), stale);
        assert_eq!(
            service.cached(id).map(|entry| entry.origin),
            Some(CacheOrigin::Persisted)
        );

        service.invalidate(Invalidation::Character(id));
        let fresh = service.ledger_for(id).expect("ledger");
        assert_eq!(fresh.available, Some(1070));
    }

    #[test]
    fn invalidate_all_clears_every_entry() {
        let a = hero();
        let b = hero();
        let characters = InMemoryCharacterStore::with_characters([a.clone(), b.clone()]);
        let service = LedgerService::new(
            rules(),
            Arc::new(characters),
            Arc::new(InMemoryApCacheStore::new()),
            clock(),
        );
        service.ledger_for(a.id).expect("ledger");
        service.ledger_for(b.id).expect("ledger");

        service.invalidate(Invalidation::All);

        assert!(service.cached(a.id).is_none());
        assert!(service.cached(b.id).is_none());
    }

    #[test]
    fn refresh_recomputes_and_saves() {
        let character = hero();
        let store = Arc::new(InMemoryApCacheStore::new());
        let service = LedgerService::new(
            rules(),
            Arc::new(InMemoryCharacterStore::new()),
            store.clone(),
            clock(),
        );
        service.ledger_for_snapshot(&character);

        let changed = character.with_active(
            ActivatableCategory::Advantage,
            "ADV_1",
            ActiveObject::new(),
        );
        let refresh = service.refresh(&changed);

        assert_eq!(refresh.persist, PersistStatus::Saved);
        assert_eq!(refresh.entry.ledger.spent_on_advantages.display, 10);
        assert_eq!(
            store.snapshot().get(&changed.id).map(|ledger| ledger.spent),
            Some(40)
        );
    }

    #[test]
    fn failed_writes_are_reported_not_raised() {
        let mut store = MockApCacheStore::new();
        store
            .expect_save()
            .returning(|_| Err(CacheError::write("cache.json", "read-only file system")));
        let service = LedgerService::new(
            rules(),
            Arc::new(InMemoryCharacterStore::new()),
            Arc::new(store),
            clock(),
        );

        let refresh = service.refresh(&hero());

        assert!(matches!(refresh.persist, PersistStatus::Failed(_)));
        assert_eq!(refresh.entry.ledger.spent_on_attributes, 30);
    }

    #[test]
    fn disabled_persistence_never_touches_the_store() {
        let mut store = MockApCacheStore::new();
        store.expect_save().never();
        let service = LedgerService::new(
            rules(),
            Arc::new(InMemoryCharacterStore::new()),
            Arc::new(store),
            clock(),
        )
        .with_persistence(false);

        assert_eq!(service.refresh(&hero()).persist, PersistStatus::Disabled);
    }

    #[test]
    fn unreadable_store_starts_empty() {
        let mut store = MockApCacheStore::new();
        store
            .expect_load()
            .returning(|| Err(CacheError::malformed("cache.json", "expected value")));
        let service = LedgerService::new(
            rules(),
            Arc::new(InMemoryCharacterStore::new()),
            Arc::new(store),
            clock(),
        );

        assert!(matches!(service.load_persisted(), LoadStatus::Failed(_)));
        assert!(service.cached(CharacterId::new()).is_none());
    }

    #[test]
    fn evict_removes_from_memory_and_store() {
        let character = hero();
        let store = Arc::new(InMemoryApCacheStore::new());
        let service = LedgerService::new(
            rules(),
            Arc::new(InMemoryCharacterStore::new()),
            store.clone(),
            clock(),
        );
        service.refresh(&character);
        assert_eq!(store.snapshot().len(), 1);

        let (removed, status) = service.evict(character.id);

        assert!(removed.is_some());
        assert_eq!(status, PersistStatus::Saved);
        assert!(store.snapshot().is_empty());
    }
}
