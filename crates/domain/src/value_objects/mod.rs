//! Value objects - Immutable domain concepts without identity

mod ap_ledger;
mod dependency;
mod diagnostic;
mod identity;
mod prerequisites;
mod requirement;
mod selection;

pub use ap_ledger::{ApLedger, SpentPair};
pub use dependency::{
    DependencyTarget, IncreasableDependency, StyleDependencies, StyleDependency, StyleFamily,
};
pub use diagnostic::Diagnostic;
pub use identity::{Pact, Sex, TraditionCategory};
pub use prerequisites::{PrerequisiteTree, TierKey};
pub use requirement::Requirement;
pub use selection::SelectionId;
