//! Style ⇄ extended slot bookkeeping
//!
//! An active style special ability opens three slots, one per entry in its
//! `extended` list. Taking an extended special ability occupies a matching
//! slot; removing a style moves occupied slots to a sibling style when one
//! accepts the same extended ability.
//!
//! Every operation takes the current dependencies by reference and returns
//! the updated copy.

use std::collections::BTreeSet;

use crate::entities::ActivatableEntry;
use crate::value_objects::{
    Diagnostic, StyleDependencies, StyleDependency, StyleFamily,
};
use crate::EntryId;

/// Dependencies after removing a style, with the markers that were lost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRemoval {
    pub dependencies: StyleDependencies,
    pub warnings: Vec<Diagnostic>,
}

/// Opens the slots of a newly activated style entry.
///
/// If a taken set slot holds an extended ability that one of the new single
/// slots names exactly, the ability moves into the new slot and the set slot
/// is freed again.
pub fn add_dependencies_for_activation(
    entry: &ActivatableEntry,
    dependencies: &StyleDependencies,
) -> StyleDependencies {
    let mut updated = dependencies.clone();
    let (Some(family), Some(extended)) = (
        StyleFamily::for_style_group(entry.gr),
        entry.extended_triple(),
    ) else {
        return updated;
    };

    let mut added: Vec<StyleDependency> = extended
        .iter()
        .map(|target| StyleDependency::available(target.clone(), entry.id.clone()))
        .collect();

    for existing in updated.family_mut(family).iter_mut() {
        if !existing.target.is_any_of() {
            continue;
        }
        let Some(marker) = existing.active.as_ref() else {
            continue;
        };
        if let Some(slot) = added
            .iter_mut()
            .find(|slot| slot.active.is_none() && slot.target.is_exactly(marker.as_str()))
        {
            slot.active = existing.active.take();
        }
    }

    updated.family_mut(family).extend(added);
    updated
}

/// Occupies a slot with a newly activated extended entry.
///
/// A free slot naming the entry exactly wins over a free set slot
/// containing it; among equals the earliest slot wins.
pub fn mark_extended_taken(
    entry: &ActivatableEntry,
    dependencies: &StyleDependencies,
) -> StyleDependencies {
    let mut updated = dependencies.clone();
    let Some(family) = StyleFamily::for_extended_group(entry.gr) else {
        return updated;
    };
    let id = entry.id.as_str();
    let slots = updated.family_mut(family);

    let index = slots
        .iter()
        .position(|dep| dep.active.is_none() && dep.target.is_exactly(id))
        .or_else(|| slots.iter().position(|dep| dep.accepts(id)));

    if let Some(index) = index {
        slots[index].active = Some(entry.id.clone());
    }
    updated
}

/// Frees the slot held by a deactivated extended entry.
pub fn clear_extended_taken(
    entry: &ActivatableEntry,
    dependencies: &StyleDependencies,
) -> StyleDependencies {
    let mut updated = dependencies.clone();
    let Some(family) = StyleFamily::for_extended_group(entry.gr) else {
        return updated;
    };
    let slots = updated.family_mut(family);

    if let Some(slot) = slots
        .iter_mut()
        .find(|dep| dep.active.as_ref() == Some(&entry.id))
    {
        slot.active = None;
    }
    updated
}

/// Removes the slots of a deactivated style entry.
///
/// Occupied slots move to the first free slot of another style in the same
/// family that accepts the same extended entry. Markers that fit nowhere are
/// dropped and reported as warnings.
pub fn remove_dependencies_for_deactivation(
    entry: &ActivatableEntry,
    dependencies: &StyleDependencies,
) -> DependencyRemoval {
    let mut updated = dependencies.clone();
    let Some(family) = StyleFamily::for_style_group(entry.gr) else {
        return DependencyRemoval {
            dependencies: updated,
            warnings: Vec::new(),
        };
    };

    let plan = plan_relocation(updated.family(family), &entry.id);
    let warnings = plan
        .unplaced
        .into_iter()
        .map(|marker| Diagnostic::InvalidDependencyState {
            family,
            origin: entry.id.clone(),
            marker,
        })
        .collect();
    *updated.family_mut(family) = plan.kept;

    DependencyRemoval {
        dependencies: updated,
        warnings,
    }
}

/// True if removing the style entry would not drop any occupied slot.
pub fn is_removal_safe(entry: &ActivatableEntry, dependencies: &StyleDependencies) -> bool {
    StyleFamily::for_style_group(entry.gr).map_or(true, |family| {
        plan_relocation(dependencies.family(family), &entry.id)
            .unplaced
            .is_empty()
    })
}

/// Ids of extended entries that a free slot would accept.
pub fn available_extended_ids(dependencies: &StyleDependencies) -> BTreeSet<EntryId> {
    dependencies
        .iter()
        .filter(|dep| dep.active.is_none())
        .flat_map(|dep| dep.target.ids().iter().cloned())
        .collect()
}

/// True if a free slot would accept `id`.
pub fn is_extended_available(dependencies: &StyleDependencies, id: &str) -> bool {
    dependencies.iter().any(|dep| dep.accepts(id))
}

struct RelocationPlan {
    kept: Vec<StyleDependency>,
    unplaced: Vec<EntryId>,
}

// Shared by removal and the safety check so both always agree.
fn plan_relocation(slots: &[StyleDependency], origin: &EntryId) -> RelocationPlan {
    let (removed, mut kept): (Vec<_>, Vec<_>) = slots
        .iter()
        .cloned()
        .partition(|dep| dep.origin == *origin);

    let mut unplaced = Vec::new();
    for marker in removed.into_iter().filter_map(|dep| dep.active) {
        match kept.iter_mut().find(|dep| dep.accepts(marker.as_str())) {
            Some(slot) => slot.active = Some(marker),
            None => unplaced.push(marker),
        }
    }

    RelocationPlan { kept, unplaced }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::DependencyTarget;

    const COMBAT_STYLE: u32 = 9;
    const COMBAT_EXTENDED: u32 = 11;

    fn style(id: &str, extended: [DependencyTarget; 3]) -> ActivatableEntry {
        ActivatableEntry::special_ability(id, id)
            .with_group(COMBAT_STYLE)
            .with_extended(extended.to_vec())
    }

    fn extended(id: &str) -> ActivatableEntry {
        ActivatableEntry::special_ability(id, id).with_group(COMBAT_EXTENDED)
    }

    fn taken(deps: &StyleDependencies) -> Vec<(&str, &str)> {
        deps.combat
            .iter()
            .filter_map(|dep| Some((dep.origin.as_str(), dep.active.as_ref()?.as_str())))
            .collect()
    }

    #[test]
    fn activation_opens_three_free_slots() {
        let first = style("SA_1", ["SA_10".into(), "SA_11".into(), "SA_12".into()]);
        let deps = add_dependencies_for_activation(&first, &StyleDependencies::default());

        assert_eq!(deps.combat.len(), 3);
        assert!(deps.combat.iter().all(|dep| dep.origin == "SA_1" && !dep.is_taken()));
        assert_eq!(available_extended_ids(&deps).len(), 3);
    }

    #[test]
    fn entries_outside_style_groups_or_without_triples_add_nothing() {
        let plain = ActivatableEntry::special_ability("SA_2", "Plain").with_group(3);
        let short = ActivatableEntry::special_ability("SA_3", "Short")
            .with_group(COMBAT_STYLE)
            .with_extended(vec!["SA_10".into()]);

        let deps = add_dependencies_for_activation(&plain, &StyleDependencies::default());
        let deps = add_dependencies_for_activation(&short, &deps);
        assert!(deps.is_empty());
    }

    #[test]
    fn taking_one_extended_leaves_two_available() {
        let first = style("SA_1", ["SA_10".into(), "SA_11".into(), "SA_12".into()]);
        let deps = add_dependencies_for_activation(&first, &StyleDependencies::default());
        let deps = mark_extended_taken(&extended("SA_10"), &deps);

        assert_eq!(taken(&deps), vec![("SA_1", "SA_10")]);
        assert_eq!(
            available_extended_ids(&deps),
            BTreeSet::from([EntryId::from("SA_11"), EntryId::from("SA_12")])
        );
    }

    #[test]
    fn availability_is_empty_once_every_slot_is_taken() {
        let first = style("SA_1", ["SA_10".into(), "SA_11".into(), "SA_12".into()]);
        let mut deps = add_dependencies_for_activation(&first, &StyleDependencies::default());
        for id in ["SA_10", "SA_11", "SA_12"] {
            deps = mark_extended_taken(&extended(id), &deps);
        }
        assert!(available_extended_ids(&deps).is_empty());
        assert!(!is_extended_available(&deps, "SA_10"));
    }

    #[test]
    fn exact_target_wins_over_set_target() {
        let first = style(
            "SA_1",
            [
                DependencyTarget::AnyOf(vec!["SA_10".into(), "SA_20".into()]),
                "SA_11".into(),
                "SA_12".into(),
            ],
        );
        let second = style("SA_2", ["SA_10".into(), "SA_13".into(), "SA_14".into()]);
        let deps = add_dependencies_for_activation(&first, &StyleDependencies::default());
        let deps = add_dependencies_for_activation(&second, &deps);
        let deps = mark_extended_taken(&extended("SA_10"), &deps);

        assert_eq!(taken(&deps), vec![("SA_2", "SA_10")]);
    }

    #[test]
    fn new_exact_slot_takes_over_from_set_slot() {
        let first = style(
            "SA_1",
            [
                DependencyTarget::AnyOf(vec!["SA_10".into(), "SA_20".into()]),
                "SA_11".into(),
                "SA_12".into(),
            ],
        );
        let deps = add_dependencies_for_activation(&first, &StyleDependencies::default());
        let deps = mark_extended_taken(&extended("SA_10"), &deps);
        assert_eq!(taken(&deps), vec![("SA_1", "SA_10")]);

        let second = style("SA_2", ["SA_10".into(), "SA_13".into(), "SA_14".into()]);
        let deps = add_dependencies_for_activation(&second, &deps);

        assert_eq!(taken(&deps), vec![("SA_2", "SA_10")]);
        assert!(is_extended_available(&deps, "SA_20"));
    }

    #[test]
    fn removal_relocates_marker_to_sibling_style() {
        let first = style("SA_1", ["SA_10".into(), "SA_11".into(), "SA_12".into()]);
        let second = style("SA_2", ["SA_10".into(), "SA_13".into(), "SA_14".into()]);
        let deps = add_dependencies_for_activation(&first, &StyleDependencies::default());
        let deps = add_dependencies_for_activation(&second, &deps);
        let deps = mark_extended_taken(&extended("SA_10"), &deps);
        assert_eq!(taken(&deps), vec![("SA_1", "SA_10")]);

        assert!(is_removal_safe(&first, &deps));
        let removal = remove_dependencies_for_deactivation(&first, &deps);

        assert!(removal.warnings.is_empty());
        assert_eq!(removal.dependencies.combat.len(), 3);
        assert_eq!(taken(&removal.dependencies), vec![("SA_2", "SA_10")]);
    }

    #[test]
    fn removal_without_sibling_drops_marker_with_warning() {
        let first = style("SA_1", ["SA_10".into(), "SA_11".into(), "SA_12".into()]);
        let deps = add_dependencies_for_activation(&first, &StyleDependencies::default());
        let deps = mark_extended_taken(&extended("SA_11"), &deps);

        assert!(!is_removal_safe(&first, &deps));
        let removal = remove_dependencies_for_deactivation(&first, &deps);

        assert!(removal.dependencies.is_empty());
        assert_eq!(
            removal.warnings,
            vec![Diagnostic::InvalidDependencyState {
                family: StyleFamily::Combat,
                origin: "SA_1".into(),
                marker: "SA_11".into(),
            }]
        );
    }

    #[test]
    fn two_markers_cannot_share_one_sibling_slot() {
        let first = style(
            "SA_1",
            [
                DependencyTarget::AnyOf(vec!["SA_10".into(), "SA_11".into()]),
                "SA_10".into(),
                "SA_12".into(),
            ],
        );
        let second = style(
            "SA_2",
            [
                DependencyTarget::AnyOf(vec!["SA_10".into(), "SA_11".into()]),
                "SA_13".into(),
                "SA_14".into(),
            ],
        );
        let deps = add_dependencies_for_activation(&first, &StyleDependencies::default());
        let deps = add_dependencies_for_activation(&second, &deps);
        let deps = mark_extended_taken(&extended("SA_10"), &deps);
        let deps = mark_extended_taken(&extended("SA_11"), &deps);

        assert!(!is_removal_safe(&first, &deps));
        let removal = remove_dependencies_for_deactivation(&first, &deps);
        assert_eq!(removal.warnings.len(), 1);
        assert_eq!(taken(&removal.dependencies).len(), 1);
    }

    #[test]
    fn clearing_frees_the_slot_again() {
        let first = style("SA_1", ["SA_10".into(), "SA_11".into(), "SA_12".into()]);
        let deps = add_dependencies_for_activation(&first, &StyleDependencies::default());
        let deps = mark_extended_taken(&extended("SA_10"), &deps);
        let deps = clear_extended_taken(&extended("SA_10"), &deps);

        assert!(taken(&deps).is_empty());
        assert!(is_extended_available(&deps, "SA_10"));
    }

    #[test]
    fn removing_a_non_style_entry_is_always_safe() {
        let deps = add_dependencies_for_activation(
            &style("SA_1", ["SA_10".into(), "SA_11".into(), "SA_12".into()]),
            &StyleDependencies::default(),
        );
        let other = ActivatableEntry::special_ability("SA_5", "Other");
        assert!(is_removal_safe(&other, &deps));
        assert_eq!(remove_dependencies_for_deactivation(&other, &deps).dependencies, deps);
    }
}
