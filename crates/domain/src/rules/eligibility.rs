//! Value bounds of skills, combat techniques, spells and chants
//!
//! `max_value` combines the caps that apply to an entry by taking the most
//! restrictive one and adds the exceptional skill bonus on top.
//! `min_value` takes the highest of the base value, the floors held by
//! dependencies and the floor keeping a chosen property or aspect
//! knowledge valid.
//!
//! Nothing here is cached. Callers query again before every change.

use std::collections::BTreeSet;

use super::property_knowledge::{
    PropertyTally, KNOWLEDGE_FLOOR, KNOWLEDGE_UNLOCK_COUNT, UNKNOWN_KNOWLEDGE_CAP,
};
use crate::entities::{
    CharacterSnapshot, IncreasableEntry, IncreasableKind, Phase, RuleData, GENERAL_TRADITION,
    MAGICAL_TRADITION_GROUP,
};
use crate::value_objects::IncreasableDependency;
use crate::well_known;
use crate::EntryId;

/// Attribute cap is the highest capping attribute plus this.
const ATTRIBUTE_CAP_BONUS: i32 = 2;

/// Creation limit that blocks activating another spell or chant.
///
/// Spells and chants are counted separately, each against the same
/// experience level maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationLimit {
    Spells { max: u32 },
    LiturgicalChants { max: u32 },
    UnfamiliarSpells { max: u32 },
}

pub struct EligibilityContext<'a> {
    rules: &'a RuleData,
    character: &'a CharacterSnapshot,
}

impl<'a> EligibilityContext<'a> {
    pub fn new(rules: &'a RuleData, character: &'a CharacterSnapshot) -> Self {
        Self { rules, character }
    }

    pub fn current_value(&self, entry: &IncreasableEntry) -> Option<i32> {
        self.character
            .increasable_value(entry.kind, entry.id.as_str())
    }

    pub fn is_increasable(&self, entry: &IncreasableEntry) -> bool {
        self.current_value(entry)
            .is_some_and(|value| value < self.max_value(entry))
    }

    pub fn is_decreasable(&self, entry: &IncreasableEntry) -> bool {
        self.current_value(entry)
            .is_some_and(|value| value > self.min_value(entry))
    }

    // Maximum

    pub fn max_value(&self, entry: &IncreasableEntry) -> i32 {
        [
            self.attribute_cap(entry),
            self.experience_level_cap(entry),
            self.knowledge_cap(entry),
        ]
        .into_iter()
        .flatten()
        .min()
        .map_or(i32::MAX, |cap| cap.saturating_add(self.exceptional_bonus(entry)))
    }

    /// Highest check (or primary) attribute plus two.
    pub fn attribute_cap(&self, entry: &IncreasableEntry) -> Option<i32> {
        entry
            .capping_attributes()
            .iter()
            .map(|id| self.character.attribute_value(id.as_str()))
            .max()
            .map(|highest| highest.saturating_add(ATTRIBUTE_CAP_BONUS))
    }

    /// Experience level limit; lifted once the character is in play.
    pub fn experience_level_cap(&self, entry: &IncreasableEntry) -> Option<i32> {
        if self.character.phase == Phase::InGame {
            return None;
        }
        let level = self
            .rules
            .experience_level(self.character.experience_level.as_str())?;
        Some(match entry.kind {
            IncreasableKind::CombatTechnique => level.max_combat_technique_rating,
            _ => level.max_skill_rating,
        })
    }

    /// 14 for a spell whose property, or a chant none of whose aspects, is known.
    pub fn knowledge_cap(&self, entry: &IncreasableEntry) -> Option<i32> {
        let (knowledge, numbers) = knowledge_numbers(entry)?;
        let known = self.character.known_numbers(knowledge);
        let any_known = numbers
            .iter()
            .any(|number| known.contains(&i64::from(*number)));
        (!any_known).then_some(UNKNOWN_KNOWLEDGE_CAP)
    }

    /// One per exceptional skill (or combat technique) instance for the entry.
    pub fn exceptional_bonus(&self, entry: &IncreasableEntry) -> i32 {
        let advantage = match entry.kind {
            IncreasableKind::CombatTechnique => well_known::EXCEPTIONAL_COMBAT_TECHNIQUE,
            _ => well_known::EXCEPTIONAL_SKILL,
        };
        let count = self
            .character
            .instances(advantage)
            .iter()
            .filter(|instance| {
                instance
                    .sid
                    .as_ref()
                    .is_some_and(|sid| sid.refers_to(entry.id.as_str()))
            })
            .count();
        i32::try_from(count).unwrap_or(i32::MAX)
    }

    // Minimum

    pub fn min_value(&self, entry: &IncreasableEntry) -> i32 {
        [
            Some(entry.kind.base_value()),
            self.dependency_floor(entry),
            self.knowledge_floor(entry),
        ]
        .into_iter()
        .flatten()
        .max()
        .unwrap_or(0)
    }

    /// Highest value required by a dependency that still holds.
    pub fn dependency_floor(&self, entry: &IncreasableEntry) -> Option<i32> {
        self.binding_dependencies(entry)
            .map(|dependency| dependency.value)
            .max()
    }

    /// True if some dependency still requires the entry to stay active.
    pub fn has_binding_dependencies(&self, entry: &IncreasableEntry) -> bool {
        self.binding_dependencies(entry).next().is_some()
    }

    fn binding_dependencies<'e>(
        &'e self,
        entry: &'e IncreasableEntry,
    ) -> impl Iterator<Item = &'a IncreasableDependency> + 'e {
        self.character
            .increasables(entry.kind)
            .get(entry.id.as_str())
            .into_iter()
            .flat_map(|state| state.dependencies.iter())
            .filter(move |dependency| !self.met_by_alternative(entry, dependency))
            .filter(move |dependency| self.is_held(&dependency.origin, &entry.id))
    }

    fn met_by_alternative(&self, entry: &IncreasableEntry, dependency: &IncreasableDependency) -> bool {
        dependency
            .alternatives
            .iter()
            .filter(|alternative| **alternative != entry.id)
            .filter_map(|alternative| {
                let other = self.rules.increasable(alternative.as_str())?;
                self.character
                    .increasable_value(other.kind, alternative.as_str())
            })
            .any(|value| value >= dependency.value)
    }

    /// Whether the entry holding a dependency is itself still in place.
    ///
    /// Active activatables, active spells and chants, and raised skills hold.
    /// A skill at its base holds if something holding holds it. The walk
    /// never revisits an entry (a revisit adds nothing) and stops after as
    /// many steps as there are known entries.
    fn is_held(&self, origin: &EntryId, dependent: &EntryId) -> bool {
        let limit = self.rules.entry_count() + 1;
        let mut visited = BTreeSet::from([dependent.clone()]);
        let mut pending = vec![origin.clone()];

        while let Some(id) = pending.pop() {
            if visited.len() > limit {
                break;
            }
            if !visited.insert(id.clone()) {
                continue;
            }
            if self.character.is_active(id.as_str()) {
                return true;
            }
            let Some(entry) = self.rules.increasable(id.as_str()) else {
                continue;
            };
            let Some(state) = self.character.increasables(entry.kind).get(id.as_str()) else {
                continue;
            };
            if entry.kind.needs_activation() || state.value > entry.kind.base_value() {
                return true;
            }
            pending.extend(
                state
                    .dependencies
                    .iter()
                    .map(|dependency| dependency.origin.clone()),
            );
        }
        false
    }

    /// 10 while the entry is one of at most three keeping a chosen
    /// property or aspect knowledge valid.
    pub fn knowledge_floor(&self, entry: &IncreasableEntry) -> Option<i32> {
        let (knowledge, numbers) = knowledge_numbers(entry)?;
        if self.current_value(entry)? < KNOWLEDGE_FLOOR {
            return None;
        }
        let known = self.character.known_numbers(knowledge);
        let tally = PropertyTally::for_kind(self.rules, self.character, entry.kind);
        numbers
            .iter()
            .any(|number| {
                known.contains(&i64::from(*number)) && tally.count(*number) <= KNOWLEDGE_UNLOCK_COUNT
            })
            .then_some(KNOWLEDGE_FLOOR)
    }

    // Spell activation

    /// True for a spell outside the general tradition and outside every
    /// magical tradition the character has.
    pub fn is_unfamiliar(&self, entry: &IncreasableEntry) -> bool {
        if entry.kind != IncreasableKind::Spell || entry.traditions.contains(&GENERAL_TRADITION) {
            return false;
        }
        let own = self.magical_traditions();
        !entry.traditions.iter().any(|number| own.contains(number))
    }

    /// Creation limit that activating `entry` would exceed, if any.
    pub fn activation_limit(&self, entry: &IncreasableEntry) -> Option<ActivationLimit> {
        if self.character.phase != Phase::Creation || !entry.kind.needs_activation() {
            return None;
        }
        let level = self
            .rules
            .experience_level(self.character.experience_level.as_str())?;

        let max = level.max_spells_liturgies;
        let active = self.character.increasables(entry.kind).len();
        if active >= usize::try_from(max).unwrap_or(usize::MAX) {
            return Some(match entry.kind {
                IncreasableKind::Spell => ActivationLimit::Spells { max },
                _ => ActivationLimit::LiturgicalChants { max },
            });
        }

        if self.is_unfamiliar(entry) {
            let unfamiliar = self
                .character
                .spells
                .keys()
                .filter_map(|id| self.rules.increasable(id.as_str()))
                .filter(|spell| self.is_unfamiliar(spell))
                .count();
            if unfamiliar >= usize::try_from(level.max_unfamiliar_spells).unwrap_or(usize::MAX) {
                return Some(ActivationLimit::UnfamiliarSpells {
                    max: level.max_unfamiliar_spells,
                });
            }
        }
        None
    }

    fn magical_traditions(&self) -> BTreeSet<u32> {
        self.character
            .special_abilities
            .keys()
            .filter_map(|id| self.rules.activatable(id.as_str()))
            .filter(|entry| entry.gr == MAGICAL_TRADITION_GROUP)
            .filter_map(|entry| entry.tradition.as_ref().map(|tradition| tradition.number))
            .collect()
    }
}

/// Knowledge special ability and the numbers an entry is filed under.
fn knowledge_numbers(entry: &IncreasableEntry) -> Option<(&'static str, Vec<u32>)> {
    match entry.kind {
        IncreasableKind::Spell => entry
            .property
            .map(|property| (well_known::PROPERTY_KNOWLEDGE, vec![property])),
        IncreasableKind::LiturgicalChant if !entry.aspects.is_empty() => {
            Some((well_known::ASPECT_KNOWLEDGE, entry.aspects.clone()))
        }
        _ => None,
    }
}
