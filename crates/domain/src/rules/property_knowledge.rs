//! Property and aspect knowledge counting.
//!
//! A property (spells) or aspect (chants) can be chosen for a knowledge
//! special ability once three entries of it are at 10 or more.

use std::collections::BTreeMap;

use crate::entities::{CharacterSnapshot, IncreasableKind, RuleData};

/// Value an entry needs to count towards its property or aspect.
pub const KNOWLEDGE_FLOOR: i32 = 10;
/// Entries at the floor needed before a knowledge can be chosen.
pub const KNOWLEDGE_UNLOCK_COUNT: usize = 3;
/// Highest value of a spell or chant whose property or aspect is not known.
pub const UNKNOWN_KNOWLEDGE_CAP: i32 = 14;

/// Per property or aspect: how many active entries are at the floor or above.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyTally {
    counts: BTreeMap<u32, usize>,
}

impl PropertyTally {
    /// Tally of the properties (spells) or aspects (chants) of `kind`.
    pub fn for_kind(rules: &RuleData, character: &CharacterSnapshot, kind: IncreasableKind) -> Self {
        let mut counts = BTreeMap::new();
        for (id, state) in character.increasables(kind) {
            if state.value < KNOWLEDGE_FLOOR {
                continue;
            }
            let Some(entry) = rules.increasable(id.as_str()) else {
                continue;
            };
            let numbers: Vec<u32> = match kind {
                IncreasableKind::Spell => entry.property.into_iter().collect(),
                IncreasableKind::LiturgicalChant => entry.aspects.clone(),
                _ => Vec::new(),
            };
            for number in numbers {
                *counts.entry(number).or_insert(0) += 1;
            }
        }
        Self { counts }
    }

    pub fn count(&self, number: u32) -> usize {
        self.counts.get(&number).copied().unwrap_or(0)
    }

    pub fn is_available(&self, number: u32) -> bool {
        self.count(number) >= KNOWLEDGE_UNLOCK_COUNT
    }
}
