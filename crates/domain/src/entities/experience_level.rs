use serde::{Deserialize, Serialize};

use crate::EntryId;

/// Starting experience level: AP and creation limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceLevel {
    pub id: EntryId,
    pub name: String,
    pub ap: i32,
    pub max_attribute_value: i32,
    pub max_skill_rating: i32,
    pub max_combat_technique_rating: i32,
    /// Spells plus liturgical chants a character may start with
    pub max_spells_liturgies: u32,
    pub max_unfamiliar_spells: u32,
}

impl ExperienceLevel {
    /// The "average" level most characters start at.
    pub fn average(id: impl Into<EntryId>) -> Self {
        Self {
            id: id.into(),
            name: "Average".to_string(),
            ap: 1100,
            max_attribute_value: 14,
            max_skill_rating: 12,
            max_combat_technique_rating: 12,
            max_spells_liturgies: 20,
            max_unfamiliar_spells: 2,
        }
    }
}
