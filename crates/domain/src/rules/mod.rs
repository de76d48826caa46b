//! Pure rules: prerequisites, style slots, value bounds and AP costs.
//!
//! Everything here is a synchronous function of rule data and a character
//! snapshot. Nothing logs, caches or performs I/O.

pub mod ap_costs;
pub mod eligibility;
pub mod prerequisites;
pub mod property_knowledge;
pub mod style_dependencies;

pub use ap_costs::{activatable_cost, attribute_cost, compute_ledger, LedgerComputation};
pub use eligibility::{ActivationLimit, EligibilityContext};
pub use prerequisites::{
    classify, first_tier_requirements, Classification, Evaluation, PrerequisiteEvaluator,
};
pub use property_knowledge::PropertyTally;
pub use style_dependencies::{
    add_dependencies_for_activation, available_extended_ids, clear_extended_taken,
    is_extended_available, is_removal_safe, mark_extended_taken,
    remove_dependencies_for_deactivation, DependencyRemoval,
};
