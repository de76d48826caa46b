//! HeroForge domain: rule data, character snapshots and the pure rules core.
//!
//! ## Structure
//!
//! - `entities/` - Static rule data tables and the character snapshot
//! - `value_objects/` - Requirements, prerequisite trees, dependencies, the AP ledger
//! - `rules/` - Prerequisite evaluation, style slots, value bounds, AP costs

pub mod entities;
pub mod ids;
pub mod rules;
pub mod value_objects;

// Re-export all entities (explicit list in entities/mod.rs)
pub use entities::{
    ActivatableCategory, ActivatableEntry, ActiveObject, ApCost, CharacterSnapshot,
    ExperienceLevel, ImprovementCost, IncreasableEntry, IncreasableKind, IncreasableState,
    NamedEntry, Phase, PurchasedEnergies, RuleData, RulesFlags, SelectOption, Tradition,
    GENERAL_TRADITION,
};

// Re-export ID types
pub use ids::{well_known, CharacterId, EntryId};

// Re-export value objects
pub use value_objects::{
    ApLedger, DependencyTarget, Diagnostic, IncreasableDependency, Pact, PrerequisiteTree,
    Requirement, SelectionId, Sex, SpentPair, StyleDependencies, StyleDependency, StyleFamily,
    TierKey, TraditionCategory,
};

// Re-export the rules entry points
pub use rules::{
    compute_ledger, EligibilityContext, LedgerComputation, PrerequisiteEvaluator, PropertyTally,
};
