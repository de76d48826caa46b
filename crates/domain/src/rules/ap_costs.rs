//! AP cost formulas and the ledger computation
//!
//! `compute_ledger` recomputes every bucket from scratch. A bucket whose
//! formula hits an id missing from the rule data is left at zero and the
//! missing ids are reported; the other buckets stay valid.

use std::collections::{BTreeMap, BTreeSet};

use super::prerequisites::classify;
use crate::entities::{
    ActivatableCategory, ActivatableEntry, ActiveObject, ApCost, CharacterSnapshot,
    ImprovementCost, IncreasableKind, NamedEntry, PurchasedEnergies, RuleData,
    BASE_ATTRIBUTE_VALUE,
};
use crate::value_objects::{ApLedger, Diagnostic, SpentPair};
use crate::EntryId;

/// AP per bought life point.
pub const LIFE_POINT_COST: i32 = 4;
/// AP per bought arcane energy or karma point.
pub const ENERGY_POINT_COST: i32 = 2;
/// AP per cantrip or blessing.
pub const MINOR_ENTRY_COST: i32 = 1;

/// Result of a ledger recomputation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerComputation {
    pub ledger: ApLedger,
    pub diagnostics: Vec<Diagnostic>,
}

pub fn compute_ledger(rules: &RuleData, character: &CharacterSnapshot) -> LedgerComputation {
    let mut diagnostics = Vec::new();
    let mut ledger = ApLedger {
        spent_on_attributes: settle(attributes_cost(rules, character), &mut diagnostics),
        spent_on_skills: settle(
            increasables_cost(rules, character, IncreasableKind::Skill),
            &mut diagnostics,
        ),
        spent_on_combat_techniques: settle(
            increasables_cost(rules, character, IncreasableKind::CombatTechnique),
            &mut diagnostics,
        ),
        spent_on_spells: settle(
            increasables_cost(rules, character, IncreasableKind::Spell),
            &mut diagnostics,
        ),
        spent_on_liturgical_chants: settle(
            increasables_cost(rules, character, IncreasableKind::LiturgicalChant),
            &mut diagnostics,
        ),
        spent_on_cantrips: settle(
            minor_entries_cost(&rules.cantrips, &character.cantrips, "cantrip"),
            &mut diagnostics,
        ),
        spent_on_blessings: settle(
            minor_entries_cost(&rules.blessings, &character.blessings, "blessing"),
            &mut diagnostics,
        ),
        spent_on_energies: energies_cost(&character.energies),
        ..ApLedger::default()
    };

    let advantages = settle(
        activatables_cost(rules, character, ActivatableCategory::Advantage),
        &mut diagnostics,
    );
    ledger.spent_on_advantages = advantages.all;
    ledger.spent_on_magical_advantages = advantages.magical;
    ledger.spent_on_blessed_advantages = advantages.blessed;

    let disadvantages = settle(
        activatables_cost(rules, character, ActivatableCategory::Disadvantage),
        &mut diagnostics,
    );
    ledger.spent_on_disadvantages = disadvantages.all;
    ledger.spent_on_magical_disadvantages = disadvantages.magical;
    ledger.spent_on_blessed_disadvantages = disadvantages.blessed;

    ledger.spent_on_special_abilities = settle(
        activatables_cost(rules, character, ActivatableCategory::SpecialAbility),
        &mut diagnostics,
    )
    .all;

    LedgerComputation {
        ledger: ledger.finalize(character.total_ap),
        diagnostics,
    }
}

/// AP of one active instance: its custom cost, or the rule data price.
///
/// Disadvantages are priced as AP gained.
pub fn activatable_cost(entry: &ActivatableEntry, instance: &ActiveObject) -> Result<i32, Diagnostic> {
    if let Some(cost) = instance.cost {
        return Ok(cost);
    }
    let missing = || Diagnostic::missing(entry.id.clone(), "ap cost");
    match &entry.cost {
        None => Ok(0),
        Some(ApCost::Flat(cost)) if entry.tiers.is_some() => {
            Ok(cost.saturating_mul(i32::from(instance.effective_tier())))
        }
        Some(ApCost::Flat(cost)) => Ok(*cost),
        Some(ApCost::PerTier(costs)) => costs
            .get(..usize::from(instance.effective_tier()))
            .map(|paid| paid.iter().fold(0_i32, |total, cost| total.saturating_add(*cost)))
            .ok_or_else(missing),
        Some(ApCost::PerSelection) => instance
            .sid
            .as_ref()
            .and_then(|sid| entry.select_option(sid))
            .and_then(|option| option.cost)
            .ok_or_else(missing),
    }
}

pub fn energies_cost(energies: &PurchasedEnergies) -> i32 {
    let life = energies.life_points.saturating_mul(LIFE_POINT_COST);
    let energy = energies
        .arcane_energy
        .saturating_add(energies.karma_points)
        .saturating_mul(ENERGY_POINT_COST);
    life.saturating_add(energy)
}

/// AP of raising an attribute from its base to `value`.
pub fn attribute_cost(value: i32) -> i32 {
    ImprovementCost::E.cost_between(BASE_ATTRIBUTE_VALUE, value)
}

fn attributes_cost(rules: &RuleData, character: &CharacterSnapshot) -> Result<i32, Vec<Diagnostic>> {
    sum_bucket(character.attributes.iter().map(|(id, value)| {
        if rules.has_attribute(id.as_str()) {
            Ok(attribute_cost(*value))
        } else {
            Err(Diagnostic::missing(id.clone(), "attribute cost"))
        }
    }))
}

fn increasables_cost(
    rules: &RuleData,
    character: &CharacterSnapshot,
    kind: IncreasableKind,
) -> Result<i32, Vec<Diagnostic>> {
    sum_bucket(character.increasables(kind).iter().map(|(id, state)| {
        rules
            .increasable(id.as_str())
            .map(|entry| entry.cost_at(state.value))
            .ok_or_else(|| Diagnostic::missing(id.clone(), "increasable cost"))
    }))
}

fn minor_entries_cost(
    table: &BTreeMap<EntryId, NamedEntry>,
    active: &BTreeSet<EntryId>,
    context: &'static str,
) -> Result<i32, Vec<Diagnostic>> {
    sum_bucket(active.iter().map(|id| {
        if table.contains_key(id) {
            Ok(MINOR_ENTRY_COST)
        } else {
            Err(Diagnostic::missing(id.clone(), context))
        }
    }))
}

#[derive(Debug, Clone, Copy, Default)]
struct CategoryCost {
    all: SpentPair,
    magical: SpentPair,
    blessed: SpentPair,
}

fn activatables_cost(
    rules: &RuleData,
    character: &CharacterSnapshot,
    category: ActivatableCategory,
) -> Result<CategoryCost, Vec<Diagnostic>> {
    let mut totals = CategoryCost::default();
    let mut missing = Vec::new();

    for (id, instances) in character.activatables(category) {
        let Some(entry) = rules.activatable(id.as_str()) else {
            missing.push(Diagnostic::missing(id.clone(), "activatable cost"));
            continue;
        };
        let classification = classify(entry);
        let counts_for_budget = !entry.no_max_ap_influence;
        for instance in instances {
            match activatable_cost(entry, instance) {
                Ok(cost) => {
                    totals.all.add(cost, counts_for_budget);
                    if classification.magical {
                        totals.magical.add(cost, counts_for_budget);
                    }
                    if classification.blessed {
                        totals.blessed.add(cost, counts_for_budget);
                    }
                }
                Err(diagnostic) => missing.push(diagnostic),
            }
        }
    }

    if missing.is_empty() {
        Ok(totals)
    } else {
        Err(missing)
    }
}

fn sum_bucket(costs: impl Iterator<Item = Result<i32, Diagnostic>>) -> Result<i32, Vec<Diagnostic>> {
    let mut total = 0;
    let mut missing = Vec::new();
    for cost in costs {
        match cost {
            Ok(cost) => total = i32::saturating_add(total, cost),
            Err(diagnostic) => missing.push(diagnostic),
        }
    }
    if missing.is_empty() {
        Ok(total)
    } else {
        Err(missing)
    }
}

/// Keeps a computed bucket, or zero plus its diagnostics.
fn settle<T: Default>(bucket: Result<T, Vec<Diagnostic>>, diagnostics: &mut Vec<Diagnostic>) -> T {
    bucket.unwrap_or_else(|missing| {
        diagnostics.extend(missing);
        T::default()
    })
}
