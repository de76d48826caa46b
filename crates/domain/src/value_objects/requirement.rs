//! Requirement - a single condition in a prerequisite tree

use serde::{Deserialize, Serialize};

use super::{SelectionId, Sex, TraditionCategory};
use crate::EntryId;

/// One condition that must hold for an entry to be activated or kept.
///
/// Threshold variants (`Attribute`, `Increasable`, `PrimaryAttribute`)
/// compare with "at least". `Activatable` style variants compare the
/// existence of a matching instance against `active`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Requirement {
    /// The character's race is (or, when negated, is not) one of `ids`
    Race {
        ids: Vec<EntryId>,
        #[serde(default)]
        negated: bool,
    },
    /// The character's culture is one of `ids`
    Culture { ids: Vec<EntryId> },
    Sex { value: Sex },
    /// The character has a pact of the given category, optionally in one of
    /// the listed domains and at a minimum level
    Pact {
        category: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        domain: Option<Vec<u32>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        level: Option<u8>,
    },
    /// The character's social status is one of `ids`
    SocialStatus { ids: Vec<EntryId> },
    /// The primary attribute of the character's magical or blessed tradition
    /// is at least `value`
    PrimaryAttribute {
        category: TraditionCategory,
        value: i32,
    },
    /// An attribute is at least `value`
    Attribute { id: EntryId, value: i32 },
    /// A skill, combat technique, spell or chant is at least `value`
    Increasable { id: EntryId, value: i32 },
    /// Another advantage, disadvantage or special ability is (in)active,
    /// optionally with a matching selection and a minimum tier
    Activatable {
        id: EntryId,
        active: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sid: Option<SelectionId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sid2: Option<SelectionId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tier: Option<u8>,
    },
    /// Any of `ids` is (in)active
    ActivatableMultiEntry {
        ids: Vec<EntryId>,
        active: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sid: Option<SelectionId>,
    },
    /// `id` is (in)active with any of the selections in `sids`
    ActivatableMultiSelect {
        id: EntryId,
        sids: Vec<SelectionId>,
        active: bool,
    },
    /// Race/culture/profession legality, checked by the caller
    Rcp,
}

impl Requirement {
    /// Shorthand for "entry must be active".
    pub fn active(id: impl Into<EntryId>) -> Self {
        Self::Activatable {
            id: id.into(),
            active: true,
            sid: None,
            sid2: None,
            tier: None,
        }
    }

    /// Shorthand for "entry must not be active".
    pub fn inactive(id: impl Into<EntryId>) -> Self {
        Self::Activatable {
            id: id.into(),
            active: false,
            sid: None,
            sid2: None,
            tier: None,
        }
    }

    /// Shorthand for "entry must be active with this selection".
    pub fn active_with(id: impl Into<EntryId>, sid: impl Into<SelectionId>) -> Self {
        Self::Activatable {
            id: id.into(),
            active: true,
            sid: Some(sid.into()),
            sid2: None,
            tier: None,
        }
    }

    pub fn attribute(id: impl Into<EntryId>, value: i32) -> Self {
        Self::Attribute {
            id: id.into(),
            value,
        }
    }

    pub fn increasable(id: impl Into<EntryId>, value: i32) -> Self {
        Self::Increasable {
            id: id.into(),
            value,
        }
    }

    /// True if this requires `id` to be active, without any selection or tier.
    pub fn requires_active(&self, id: &str) -> bool {
        matches!(
            self,
            Self::Activatable { id: req, active: true, .. } if req == id
        )
    }
}
