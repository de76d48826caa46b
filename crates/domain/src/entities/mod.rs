//! Domain entities - Static rule data and the character snapshot

mod activatable;
mod character;
mod experience_level;
mod increasable;
mod rule_data;

pub use activatable::{ActivatableCategory, ActivatableEntry, ApCost, SelectOption, Tradition};
pub use character::{
    ActiveObject, CharacterSnapshot, IncreasableState, Phase, PurchasedEnergies, RulesFlags,
    BASE_ATTRIBUTE_VALUE,
};
pub use experience_level::ExperienceLevel;
pub use increasable::{ImprovementCost, IncreasableEntry, IncreasableKind, GENERAL_TRADITION};
pub use rule_data::{NamedEntry, RuleData, BLESSED_TRADITION_GROUP, MAGICAL_TRADITION_GROUP};
