//! Increasable entries - skills, combat techniques, spells and liturgical chants

use serde::{Deserialize, Serialize};

use crate::value_objects::PrerequisiteTree;
use crate::EntryId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncreasableKind {
    Skill,
    CombatTechnique,
    Spell,
    LiturgicalChant,
}

impl IncreasableKind {
    pub const ALL: [IncreasableKind; 4] = [
        Self::Skill,
        Self::CombatTechnique,
        Self::Spell,
        Self::LiturgicalChant,
    ];

    /// Value every character starts with.
    pub fn base_value(self) -> i32 {
        match self {
            Self::CombatTechnique => 6,
            _ => 0,
        }
    }

    /// Spells and chants must be activated before they have a value.
    pub fn needs_activation(self) -> bool {
        matches!(self, Self::Spell | Self::LiturgicalChant)
    }
}

/// Improvement cost column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImprovementCost {
    A,
    B,
    C,
    D,
    E,
}

impl ImprovementCost {
    /// AP per step in the flat part of the column.
    pub fn base(self) -> i32 {
        match self {
            Self::A => 1,
            Self::B => 2,
            Self::C => 3,
            Self::D => 4,
            Self::E => 15,
        }
    }

    /// Last value still raised at the flat rate.
    fn flat_until(self) -> i32 {
        match self {
            Self::E => 14,
            _ => 12,
        }
    }

    /// AP to raise a value to `to` from `to - 1`.
    pub fn step_cost(self, to: i32) -> i32 {
        let flat_until = self.flat_until();
        if to > flat_until {
            self.base().saturating_mul(to - (flat_until - 1))
        } else {
            self.base()
        }
    }

    /// AP to raise a value from `from` to `to`; zero if `to <= from`.
    ///
    /// Closed form over the flat and the steep part of the column, so the
    /// cost of any range is constant time and saturates at `i32::MAX`.
    pub fn cost_between(self, from: i32, to: i32) -> i32 {
        if to <= from {
            return 0;
        }
        let flat_until = i128::from(self.flat_until());
        let low = i128::from(from) + 1;
        let high = i128::from(to);

        let flat_steps = (high.min(flat_until) - low + 1).max(0);
        let steep_low = low.max(flat_until + 1);
        let steep_multiples = if high >= steep_low {
            let first = steep_low - flat_until + 1;
            let last = high - flat_until + 1;
            (first + last) * (last - first + 1) / 2
        } else {
            0
        };

        let total = i128::from(self.base()) * (flat_steps + steep_multiples);
        i32::try_from(total).unwrap_or(i32::MAX)
    }

    /// AP to activate a spell or chant at value 0.
    pub fn activation_cost(self) -> i32 {
        self.base()
    }
}

/// Number of the general tradition every spellcaster may use.
pub const GENERAL_TRADITION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncreasableEntry {
    pub id: EntryId,
    pub name: String,
    pub kind: IncreasableKind,
    pub ic: ImprovementCost,
    /// Attributes of the skill check (skills, spells, chants)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub check: Vec<EntryId>,
    /// Primary attributes (combat techniques)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub primary: Vec<EntryId>,
    /// Property of a spell
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<u32>,
    /// Aspects of a liturgical chant
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aspects: Vec<u32>,
    /// Traditions a spell belongs to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub traditions: Vec<u32>,
    #[serde(default)]
    pub gr: u32,
    #[serde(default)]
    pub prerequisites: PrerequisiteTree,
}

impl IncreasableEntry {
    pub fn new(
        id: impl Into<EntryId>,
        name: impl Into<String>,
        kind: IncreasableKind,
        ic: ImprovementCost,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            ic,
            check: Vec::new(),
            primary: Vec::new(),
            property: None,
            aspects: Vec::new(),
            traditions: Vec::new(),
            gr: 0,
            prerequisites: PrerequisiteTree::new(),
        }
    }

    pub fn with_check(mut self, check: [&str; 3]) -> Self {
        self.check = check.into_iter().map(EntryId::from).collect();
        self
    }

    pub fn with_primary(mut self, primary: Vec<EntryId>) -> Self {
        self.primary = primary;
        self
    }

    pub fn with_property(mut self, property: u32) -> Self {
        self.property = Some(property);
        self
    }

    pub fn with_aspects(mut self, aspects: Vec<u32>) -> Self {
        self.aspects = aspects;
        self
    }

    pub fn with_traditions(mut self, traditions: Vec<u32>) -> Self {
        self.traditions = traditions;
        self
    }

    pub fn with_prerequisites(mut self, prerequisites: PrerequisiteTree) -> Self {
        self.prerequisites = prerequisites;
        self
    }

    /// Attributes whose values bound the maximum rating.
    ///
    /// Combat techniques use their primary attributes, or the check
    /// attributes when no primary attribute is listed.
    pub fn capping_attributes(&self) -> &[EntryId] {
        match self.kind {
            IncreasableKind::CombatTechnique if !self.primary.is_empty() => &self.primary,
            _ => &self.check,
        }
    }

    /// AP spent on this entry at `value`, activation included.
    pub fn cost_at(&self, value: i32) -> i32 {
        let raised = self.ic.cost_between(self.kind.base_value(), value);
        if self.kind.needs_activation() {
            self.ic.activation_cost().saturating_add(raised)
        } else {
            raised
        }
    }
}
