//! Static rule data tables
//!
//! Read-only tables keyed by entry id. Loading and localising them is the
//! job of a content loader; the rules only look things up.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{ActivatableEntry, ExperienceLevel, IncreasableEntry};
use crate::EntryId;

/// Special ability group of magical traditions.
pub const MAGICAL_TRADITION_GROUP: u32 = 5;
/// Special ability group of blessed traditions.
pub const BLESSED_TRADITION_GROUP: u32 = 6;

/// Entry that only needs to exist (attributes, races, cantrips, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEntry {
    pub id: EntryId,
    pub name: String,
}

impl NamedEntry {
    pub fn new(id: impl Into<EntryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleData {
    #[serde(default)]
    pub activatables: BTreeMap<EntryId, ActivatableEntry>,
    #[serde(default)]
    pub increasables: BTreeMap<EntryId, IncreasableEntry>,
    #[serde(default)]
    pub attributes: BTreeMap<EntryId, NamedEntry>,
    #[serde(default)]
    pub races: BTreeMap<EntryId, NamedEntry>,
    #[serde(default)]
    pub cultures: BTreeMap<EntryId, NamedEntry>,
    #[serde(default)]
    pub social_statuses: BTreeMap<EntryId, NamedEntry>,
    #[serde(default)]
    pub experience_levels: BTreeMap<EntryId, ExperienceLevel>,
    #[serde(default)]
    pub cantrips: BTreeMap<EntryId, NamedEntry>,
    #[serde(default)]
    pub blessings: BTreeMap<EntryId, NamedEntry>,
}

impl RuleData {
    pub fn new() -> Self {
        Self::default()
    }

    // Builder methods

    pub fn with_activatable(mut self, entry: ActivatableEntry) -> Self {
        self.activatables.insert(entry.id.clone(), entry);
        self
    }

    pub fn with_increasable(mut self, entry: IncreasableEntry) -> Self {
        self.increasables.insert(entry.id.clone(), entry);
        self
    }

    pub fn with_experience_level(mut self, level: ExperienceLevel) -> Self {
        self.experience_levels.insert(level.id.clone(), level);
        self
    }

    pub fn with_attribute(self, id: &str, name: &str) -> Self {
        self.with_named(|data| &mut data.attributes, id, name)
    }

    pub fn with_race(self, id: &str, name: &str) -> Self {
        self.with_named(|data| &mut data.races, id, name)
    }

    pub fn with_culture(self, id: &str, name: &str) -> Self {
        self.with_named(|data| &mut data.cultures, id, name)
    }

    pub fn with_social_status(self, id: &str, name: &str) -> Self {
        self.with_named(|data| &mut data.social_statuses, id, name)
    }

    pub fn with_cantrip(self, id: &str, name: &str) -> Self {
        self.with_named(|data| &mut data.cantrips, id, name)
    }

    pub fn with_blessing(self, id: &str, name: &str) -> Self {
        self.with_named(|data| &mut data.blessings, id, name)
    }

    fn with_named(
        mut self,
        table: impl FnOnce(&mut Self) -> &mut BTreeMap<EntryId, NamedEntry>,
        id: &str,
        name: &str,
    ) -> Self {
        table(&mut self).insert(EntryId::from(id), NamedEntry::new(id, name));
        self
    }

    // Lookups

    pub fn activatable(&self, id: &str) -> Option<&ActivatableEntry> {
        self.activatables.get(id)
    }

    pub fn increasable(&self, id: &str) -> Option<&IncreasableEntry> {
        self.increasables.get(id)
    }

    pub fn experience_level(&self, id: &str) -> Option<&ExperienceLevel> {
        self.experience_levels.get(id)
    }

    pub fn has_attribute(&self, id: &str) -> bool {
        self.attributes.contains_key(id)
    }

    /// Number of entries a dependency walk can visit.
    pub fn entry_count(&self) -> usize {
        self.activatables.len() + self.increasables.len()
    }
}
