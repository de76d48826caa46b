//! Cross-entry dependencies recorded on a character.
//!
//! Two kinds exist:
//! - [`StyleDependency`]: a slot opened by an active style special ability
//!   that one extended special ability can occupy.
//! - [`IncreasableDependency`]: a floor on a skill, spell, chant or combat
//!   technique held by the entry that required it.

use serde::{Deserialize, Serialize};

use crate::EntryId;

/// Family of style special abilities and the extended abilities they unlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleFamily {
    Combat,
    Magical,
    Blessed,
    Skill,
}

impl StyleFamily {
    pub const ALL: [StyleFamily; 4] = [Self::Combat, Self::Magical, Self::Blessed, Self::Skill];

    /// Family of a style entry by its special ability group.
    ///
    /// Armed (9) and unarmed (10) combat styles share one family.
    pub fn for_style_group(group: u32) -> Option<Self> {
        match group {
            9 | 10 => Some(Self::Combat),
            13 => Some(Self::Magical),
            25 => Some(Self::Blessed),
            33 => Some(Self::Skill),
            _ => None,
        }
    }

    /// Family of an extended entry by its special ability group.
    pub fn for_extended_group(group: u32) -> Option<Self> {
        match group {
            11 => Some(Self::Combat),
            14 => Some(Self::Magical),
            26 => Some(Self::Blessed),
            34 => Some(Self::Skill),
            _ => None,
        }
    }
}

/// What may occupy a slot: one specific entry, or any one of a set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependencyTarget {
    Single(EntryId),
    AnyOf(Vec<EntryId>),
}

impl DependencyTarget {
    pub fn contains(&self, id: &str) -> bool {
        match self {
            Self::Single(target) => target == id,
            Self::AnyOf(targets) => targets.iter().any(|target| target == id),
        }
    }

    /// True only for a single target equal to `id`.
    pub fn is_exactly(&self, id: &str) -> bool {
        matches!(self, Self::Single(target) if target == id)
    }

    pub fn is_any_of(&self) -> bool {
        matches!(self, Self::AnyOf(_))
    }

    pub fn ids(&self) -> &[EntryId] {
        match self {
            Self::Single(target) => std::slice::from_ref(target),
            Self::AnyOf(targets) => targets,
        }
    }
}

impl From<&str> for DependencyTarget {
    fn from(value: &str) -> Self {
        Self::Single(value.into())
    }
}

/// One extended slot opened by a style entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleDependency {
    pub target: DependencyTarget,
    /// Extended entry currently occupying the slot; `None` means available.
    #[serde(default)]
    pub active: Option<EntryId>,
    /// Style entry that opened the slot.
    pub origin: EntryId,
}

impl StyleDependency {
    /// An unoccupied slot.
    pub fn available(target: DependencyTarget, origin: EntryId) -> Self {
        Self {
            target,
            active: None,
            origin,
        }
    }

    pub fn is_taken(&self) -> bool {
        self.active.is_some()
    }

    /// True if the slot is free and `id` could occupy it.
    pub fn accepts(&self, id: &str) -> bool {
        self.active.is_none() && self.target.contains(id)
    }
}

/// Style slots of a character, one ordered list per family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleDependencies {
    #[serde(default)]
    pub combat: Vec<StyleDependency>,
    #[serde(default)]
    pub magical: Vec<StyleDependency>,
    #[serde(default)]
    pub blessed: Vec<StyleDependency>,
    #[serde(default)]
    pub skill: Vec<StyleDependency>,
}

impl StyleDependencies {
    pub fn family(&self, family: StyleFamily) -> &[StyleDependency] {
        match family {
            StyleFamily::Combat => &self.combat,
            StyleFamily::Magical => &self.magical,
            StyleFamily::Blessed => &self.blessed,
            StyleFamily::Skill => &self.skill,
        }
    }

    pub fn family_mut(&mut self, family: StyleFamily) -> &mut Vec<StyleDependency> {
        match family {
            StyleFamily::Combat => &mut self.combat,
            StyleFamily::Magical => &mut self.magical,
            StyleFamily::Blessed => &mut self.blessed,
            StyleFamily::Skill => &mut self.skill,
        }
    }

    /// Every dependency across all families.
    pub fn iter(&self) -> impl Iterator<Item = &StyleDependency> {
        StyleFamily::ALL
            .into_iter()
            .flat_map(move |family| self.family(family).iter())
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// A floor on an increasable entry, held by the entry that required it.
///
/// With `alternatives` set, the floor is "one of these entries must be at
/// least `value`" and binds only while no other alternative meets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncreasableDependency {
    pub origin: EntryId,
    pub value: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<EntryId>,
}

impl IncreasableDependency {
    pub fn new(origin: impl Into<EntryId>, value: i32) -> Self {
        Self {
            origin: origin.into(),
            value,
            alternatives: Vec::new(),
        }
    }

    pub fn with_alternatives(mut self, alternatives: Vec<EntryId>) -> Self {
        self.alternatives = alternatives;
        self
    }
}
