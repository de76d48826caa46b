//! Character snapshot
//!
//! The rules read a character through this value; they never mutate it.
//! Use cases return an updated copy for the caller to commit.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::{ActivatableCategory, IncreasableKind};
use crate::value_objects::{
    IncreasableDependency, Pact, SelectionId, Sex, StyleDependencies,
};
use crate::{CharacterId, EntryId};

/// Attribute value a character has before buying anything.
pub const BASE_ATTRIBUTE_VALUE: i32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Choosing race, culture and profession
    Rcp,
    Creation,
    InGame,
}

/// One active instance of an activatable entry.
///
/// Its origin index is its position in the entry's instance list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<SelectionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid2: Option<SelectionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<u8>,
    /// Custom cost overriding the rule data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<i32>,
}

impl ActiveObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sid(mut self, sid: impl Into<SelectionId>) -> Self {
        self.sid = Some(sid.into());
        self
    }

    pub fn with_sid2(mut self, sid2: impl Into<SelectionId>) -> Self {
        self.sid2 = Some(sid2.into());
        self
    }

    pub fn with_tier(mut self, tier: u8) -> Self {
        self.tier = Some(tier);
        self
    }

    pub fn with_cost(mut self, cost: i32) -> Self {
        self.cost = Some(cost);
        self
    }

    /// Tier used for prerequisites and costs; untiered instances count as 1.
    pub fn effective_tier(&self) -> u8 {
        self.tier.unwrap_or(1)
    }
}

/// Current value of a skill, combat technique, spell or chant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncreasableState {
    pub value: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<IncreasableDependency>,
}

impl IncreasableState {
    pub fn at(value: i32) -> Self {
        Self {
            value,
            dependencies: Vec::new(),
        }
    }
}

/// Life points, arcane energy and karma points bought with AP.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchasedEnergies {
    pub life_points: i32,
    pub arcane_energy: i32,
    pub karma_points: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesFlags {
    #[serde(default)]
    pub enabled_books: BTreeSet<String>,
    /// Allow spending beyond the AP budget
    #[serde(default)]
    pub ignore_ap_limit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSnapshot {
    pub id: CharacterId,
    pub name: String,
    pub experience_level: EntryId,
    pub phase: Phase,
    /// AP budget; `None` leaves spending unbounded
    #[serde(default)]
    pub total_ap: Option<i32>,
    #[serde(default)]
    pub race: Option<EntryId>,
    #[serde(default)]
    pub culture: Option<EntryId>,
    #[serde(default)]
    pub profession: Option<EntryId>,
    #[serde(default)]
    pub sex: Option<Sex>,
    #[serde(default)]
    pub social_status: Option<EntryId>,
    #[serde(default)]
    pub pact: Option<Pact>,
    #[serde(default)]
    pub attributes: BTreeMap<EntryId, i32>,
    #[serde(default)]
    pub advantages: BTreeMap<EntryId, Vec<ActiveObject>>,
    #[serde(default)]
    pub disadvantages: BTreeMap<EntryId, Vec<ActiveObject>>,
    #[serde(default)]
    pub special_abilities: BTreeMap<EntryId, Vec<ActiveObject>>,
    #[serde(default)]
    pub skills: BTreeMap<EntryId, IncreasableState>,
    #[serde(default)]
    pub combat_techniques: BTreeMap<EntryId, IncreasableState>,
    /// Active spells; absent means inactive
    #[serde(default)]
    pub spells: BTreeMap<EntryId, IncreasableState>,
    /// Active liturgical chants; absent means inactive
    #[serde(default)]
    pub liturgical_chants: BTreeMap<EntryId, IncreasableState>,
    #[serde(default)]
    pub cantrips: BTreeSet<EntryId>,
    #[serde(default)]
    pub blessings: BTreeSet<EntryId>,
    #[serde(default)]
    pub energies: PurchasedEnergies,
    #[serde(default)]
    pub style_dependencies: StyleDependencies,
    #[serde(default)]
    pub rules: RulesFlags,
}

impl CharacterSnapshot {
    pub fn new(id: CharacterId, name: impl Into<String>, experience_level: impl Into<EntryId>) -> Self {
        Self {
            id,
            name: name.into(),
            experience_level: experience_level.into(),
            phase: Phase::Creation,
            total_ap: None,
            race: None,
            culture: None,
            profession: None,
            sex: None,
            social_status: None,
            pact: None,
            attributes: BTreeMap::new(),
            advantages: BTreeMap::new(),
            disadvantages: BTreeMap::new(),
            special_abilities: BTreeMap::new(),
            skills: BTreeMap::new(),
            combat_techniques: BTreeMap::new(),
            spells: BTreeMap::new(),
            liturgical_chants: BTreeMap::new(),
            cantrips: BTreeSet::new(),
            blessings: BTreeSet::new(),
            energies: PurchasedEnergies::default(),
            style_dependencies: StyleDependencies::default(),
            rules: RulesFlags::default(),
        }
    }

    // Builder methods

    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_total_ap(mut self, total_ap: i32) -> Self {
        self.total_ap = Some(total_ap);
        self
    }

    pub fn with_attribute(mut self, id: &str, value: i32) -> Self {
        self.attributes.insert(id.into(), value);
        self
    }

    pub fn with_active(mut self, category: ActivatableCategory, id: &str, instance: ActiveObject) -> Self {
        self.activatables_mut(category)
            .entry(id.into())
            .or_default()
            .push(instance);
        self
    }

    pub fn with_increasable(mut self, kind: IncreasableKind, id: &str, value: i32) -> Self {
        self.increasables_mut(kind)
            .insert(id.into(), IncreasableState::at(value));
        self
    }

    // Activatables

    pub fn activatables(&self, category: ActivatableCategory) -> &BTreeMap<EntryId, Vec<ActiveObject>> {
        match category {
            ActivatableCategory::Advantage => &self.advantages,
            ActivatableCategory::Disadvantage => &self.disadvantages,
            ActivatableCategory::SpecialAbility => &self.special_abilities,
        }
    }

    pub fn activatables_mut(
        &mut self,
        category: ActivatableCategory,
    ) -> &mut BTreeMap<EntryId, Vec<ActiveObject>> {
        match category {
            ActivatableCategory::Advantage => &mut self.advantages,
            ActivatableCategory::Disadvantage => &mut self.disadvantages,
            ActivatableCategory::SpecialAbility => &mut self.special_abilities,
        }
    }

    /// Active instances of `id` in whichever category holds it.
    pub fn instances(&self, id: &str) -> &[ActiveObject] {
        ActivatableCategory::ALL
            .into_iter()
            .find_map(|category| self.activatables(category).get(id))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_active(&self, id: &str) -> bool {
        !self.instances(id).is_empty()
    }

    // Increasables

    pub fn increasables(&self, kind: IncreasableKind) -> &BTreeMap<EntryId, IncreasableState> {
        match kind {
            IncreasableKind::Skill => &self.skills,
            IncreasableKind::CombatTechnique => &self.combat_techniques,
            IncreasableKind::Spell => &self.spells,
            IncreasableKind::LiturgicalChant => &self.liturgical_chants,
        }
    }

    pub fn increasables_mut(&mut self, kind: IncreasableKind) -> &mut BTreeMap<EntryId, IncreasableState> {
        match kind {
            IncreasableKind::Skill => &mut self.skills,
            IncreasableKind::CombatTechnique => &mut self.combat_techniques,
            IncreasableKind::Spell => &mut self.spells,
            IncreasableKind::LiturgicalChant => &mut self.liturgical_chants,
        }
    }

    /// Current value, or `None` for an inactive spell or chant.
    ///
    /// Skills and combat techniques always have a value; missing ones sit
    /// at their base.
    pub fn increasable_value(&self, kind: IncreasableKind, id: &str) -> Option<i32> {
        match self.increasables(kind).get(id) {
            Some(state) => Some(state.value),
            None if kind.needs_activation() => None,
            None => Some(kind.base_value()),
        }
    }

    pub fn attribute_value(&self, id: &str) -> i32 {
        self.attributes
            .get(id)
            .copied()
            .unwrap_or(BASE_ATTRIBUTE_VALUE)
    }

    /// Property or aspect numbers selected for a knowledge special ability.
    pub fn known_numbers(&self, knowledge_id: &str) -> BTreeSet<i64> {
        self.instances(knowledge_id)
            .iter()
            .filter_map(|instance| instance.sid.as_ref().and_then(SelectionId::as_number))
            .collect()
    }
}
