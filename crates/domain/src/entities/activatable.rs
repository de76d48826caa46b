//! Activatable entries - advantages, disadvantages and special abilities
//!
//! Static rule data describing something a character can switch on,
//! optionally with selections and tiers. The character side lives in
//! [`ActiveObject`](crate::ActiveObject).

use serde::{Deserialize, Serialize};

use crate::value_objects::{DependencyTarget, PrerequisiteTree, SelectionId};
use crate::EntryId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivatableCategory {
    Advantage,
    Disadvantage,
    SpecialAbility,
}

impl ActivatableCategory {
    pub const ALL: [ActivatableCategory; 3] =
        [Self::Advantage, Self::Disadvantage, Self::SpecialAbility];
}

/// How an activatable entry is priced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ApCost {
    /// Fixed AP; multiplied by the tier for tiered entries
    Flat(i32),
    /// AP of each tier; an instance at tier N pays the first N entries
    PerTier(Vec<i32>),
    /// AP taken from the selected option
    PerSelection,
}

/// One selectable option of an activatable entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub id: SelectionId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<i32>,
    #[serde(default, skip_serializing_if = "PrerequisiteTree::is_empty")]
    pub prerequisites: PrerequisiteTree,
}

impl SelectOption {
    pub fn new(id: impl Into<SelectionId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cost: None,
            prerequisites: PrerequisiteTree::new(),
        }
    }

    pub fn with_cost(mut self, cost: i32) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn with_prerequisites(mut self, prerequisites: PrerequisiteTree) -> Self {
        self.prerequisites = prerequisites;
        self
    }
}

/// Tradition metadata carried by magical and blessed tradition entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tradition {
    /// Number spells and chants list in their `traditions`.
    pub number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_attribute: Option<EntryId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivatableEntry {
    pub id: EntryId,
    pub name: String,
    pub category: ActivatableCategory,
    /// Group number within the category (style families, traditions, ...)
    #[serde(default)]
    pub gr: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<ApCost>,
    #[serde(default)]
    pub prerequisites: PrerequisiteTree,
    /// Highest tier; `None` for untiered entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiers: Option<u8>,
    /// How many instances may be active at once; `None` means one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
    /// Extended abilities unlocked by a style entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended: Option<Vec<DependencyTarget>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub select_options: Vec<SelectOption>,
    /// Cost is shown but not checked against the AP budget
    #[serde(default)]
    pub no_max_ap_influence: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tradition: Option<Tradition>,
}

impl ActivatableEntry {
    pub fn new(
        id: impl Into<EntryId>,
        name: impl Into<String>,
        category: ActivatableCategory,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            gr: 0,
            cost: None,
            prerequisites: PrerequisiteTree::new(),
            tiers: None,
            max: None,
            extended: None,
            select_options: Vec::new(),
            no_max_ap_influence: false,
            tradition: None,
        }
    }

    pub fn advantage(id: impl Into<EntryId>, name: impl Into<String>) -> Self {
        Self::new(id, name, ActivatableCategory::Advantage)
    }

    pub fn disadvantage(id: impl Into<EntryId>, name: impl Into<String>) -> Self {
        Self::new(id, name, ActivatableCategory::Disadvantage)
    }

    pub fn special_ability(id: impl Into<EntryId>, name: impl Into<String>) -> Self {
        Self::new(id, name, ActivatableCategory::SpecialAbility)
    }

    // Builder methods

    pub fn with_group(mut self, gr: u32) -> Self {
        self.gr = gr;
        self
    }

    pub fn with_cost(mut self, cost: ApCost) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn with_prerequisites(mut self, prerequisites: PrerequisiteTree) -> Self {
        self.prerequisites = prerequisites;
        self
    }

    pub fn with_tiers(mut self, tiers: u8) -> Self {
        self.tiers = Some(tiers);
        self
    }

    pub fn with_max(mut self, max: u32) -> Self {
        self.max = Some(max);
        self
    }

    pub fn with_extended(mut self, extended: Vec<DependencyTarget>) -> Self {
        self.extended = Some(extended);
        self
    }

    pub fn with_select_options(mut self, options: Vec<SelectOption>) -> Self {
        self.select_options = options;
        self
    }

    pub fn with_tradition(mut self, tradition: Tradition) -> Self {
        self.tradition = Some(tradition);
        self
    }

    pub fn without_max_ap_influence(mut self) -> Self {
        self.no_max_ap_influence = true;
        self
    }

    // Queries

    pub fn select_option(&self, sid: &SelectionId) -> Option<&SelectOption> {
        self.select_options.iter().find(|option| option.id == *sid)
    }

    /// Maximum number of simultaneous instances.
    pub fn max_instances(&self) -> u32 {
        self.max.unwrap_or(1)
    }

    /// The three extended targets of a style entry, if it is one.
    pub fn extended_triple(&self) -> Option<&[DependencyTarget]> {
        self.extended
            .as_deref()
            .filter(|extended| extended.len() == 3)
    }
}
