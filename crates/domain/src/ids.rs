use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

// Character (hero) identity; the only runtime-generated ID
define_id!(CharacterId);

/// Identifier of a static rule-data entry (`"ADV_12"`, `"SA_9"`, `"SPELL_4"`, ...).
///
/// Static ids come from the content tables and are never generated at runtime,
/// so this wraps the string instead of a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for EntryId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for EntryId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for EntryId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Entries the rules refer to by id.
pub mod well_known {
    /// Blessed One advantage.
    pub const BLESSED: &str = "ADV_12";
    /// Exceptional Skill advantage; `sid` names the skill or spell.
    pub const EXCEPTIONAL_SKILL: &str = "ADV_16";
    /// Exceptional Combat Technique advantage; `sid` names the combat technique.
    pub const EXCEPTIONAL_COMBAT_TECHNIQUE: &str = "ADV_17";
    /// Spellcaster advantage.
    pub const SPELLCASTER: &str = "ADV_50";
    /// Property Knowledge special ability; `sid` is the property number.
    pub const PROPERTY_KNOWLEDGE: &str = "SA_72";
    /// Aspect Knowledge special ability; `sid` is the aspect number.
    pub const ASPECT_KNOWLEDGE: &str = "SA_87";
}
