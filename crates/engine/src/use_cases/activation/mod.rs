//! Activation use cases for advantages, disadvantages and special abilities.
//!
//! Every operation validates the request against the rules, builds the
//! updated snapshot (instances, style slots, increasable floors) and
//! refreshes the ledger cache for it. The returned snapshot is what the
//! caller commits; if it is discarded instead, the caller invalidates the
//! character's ledger.

use std::sync::Arc;

use heroforge_domain::rules::{
    activatable_cost, add_dependencies_for_activation, clear_extended_taken,
    is_extended_available, is_removal_safe, mark_extended_taken,
    remove_dependencies_for_deactivation,
};
use heroforge_domain::{
    well_known, ActivatableCategory, ActivatableEntry, ActiveObject, CharacterSnapshot,
    Diagnostic, EntryId, IncreasableDependency, IncreasableKind, IncreasableState,
    PrerequisiteEvaluator, PropertyTally, Requirement, RuleData, SelectionId, StyleFamily,
};

use super::ledger::LedgerService;
use super::{over_budget, ChangeOutcome};

#[derive(Debug, thiserror::Error)]
pub enum ActivationError {
    #[error("Unknown entry: {0}")]
    UnknownEntry(EntryId),
    #[error("Prerequisites not met for {id}")]
    PrerequisitesNotMet { id: EntryId, unmet: Vec<Requirement> },
    #[error("{id} already has the maximum of {max} active instances")]
    InstanceLimit { id: EntryId, max: u32 },
    #[error("Tier {tier} is outside 1..={max} for {id}")]
    InvalidTier { id: EntryId, tier: u8, max: u8 },
    #[error("Selection {sid:?} is not available for {id}")]
    InvalidSelection { id: EntryId, sid: Option<SelectionId> },
    #[error("No free style slot accepts {0}")]
    NoExtendedSlot(EntryId),
    #[error("{id} has no active instance {index}")]
    NotActive { id: EntryId, index: usize },
    #[error("Removing {0} would free an occupied style slot")]
    RemovalUnsafe(EntryId),
    #[error("{id} is required by {required_by}")]
    StillRequired { id: EntryId, required_by: EntryId },
    #[error("Not enough AP: {cost} needed, {available} available")]
    InsufficientAp { cost: i32, available: i32 },
    #[error("Cost unavailable: {0}")]
    Cost(Diagnostic),
}

pub struct ActivationUseCases {
    rules: Arc<RuleData>,
    ledger: Arc<LedgerService>,
    ignore_ap_limit: bool,
}

impl ActivationUseCases {
    pub fn new(rules: Arc<RuleData>, ledger: Arc<LedgerService>, ignore_ap_limit: bool) -> Self {
        Self {
            rules,
            ledger,
            ignore_ap_limit,
        }
    }

    /// Adds `instance` of entry `id` to the character.
    pub fn activate(
        &self,
        character: &CharacterSnapshot,
        id: &str,
        instance: ActiveObject,
    ) -> Result<ChangeOutcome, ActivationError> {
        let entry = self.entry(id)?;

        let active = character.instances(id).len();
        let max = entry.max_instances();
        if u32::try_from(active).unwrap_or(u32::MAX) >= max {
            return Err(ActivationError::InstanceLimit {
                id: entry.id.clone(),
                max,
            });
        }

        let tier = validate_tier(entry, instance.tier)?;
        self.validate_selection(entry, character, &instance)?;
        let diagnostics = self.check_prerequisites(entry, character, &instance, tier)?;

        if StyleFamily::for_extended_group(entry.gr).is_some()
            && !is_extended_available(&character.style_dependencies, id)
        {
            return Err(ActivationError::NoExtendedSlot(entry.id.clone()));
        }

        let cost = activatable_cost(entry, &instance).map_err(ActivationError::Cost)?;
        self.ensure_affordable(character, entry, cost)?;

        let mut updated = character.clone();
        updated
            .activatables_mut(entry.category)
            .entry(entry.id.clone())
            .or_default()
            .push(instance);
        updated.style_dependencies =
            add_dependencies_for_activation(entry, &updated.style_dependencies);
        updated.style_dependencies = mark_extended_taken(entry, &updated.style_dependencies);
        sync_increasable_dependencies(&self.rules, &mut updated, entry);

        tracing::debug!(character_id = %character.id, entry = %entry.id, cost, "Activated entry");
        Ok(self.commit(updated, diagnostics))
    }

    /// Removes the instance at `index` of entry `id`.
    pub fn deactivate(
        &self,
        character: &CharacterSnapshot,
        id: &str,
        index: usize,
    ) -> Result<ChangeOutcome, ActivationError> {
        let entry = self.entry(id)?;
        let instances = character.instances(id);
        let instance = instances
            .get(index)
            .ok_or_else(|| ActivationError::NotActive {
                id: entry.id.clone(),
                index,
            })?;
        let last = instances.len() == 1;

        if last && !is_removal_safe(entry, &character.style_dependencies) {
            return Err(ActivationError::RemovalUnsafe(entry.id.clone()));
        }

        let cost = activatable_cost(entry, instance).map_err(ActivationError::Cost)?;
        self.ensure_affordable(character, entry, -cost)?;

        let mut updated = character.clone();
        {
            let active = updated.activatables_mut(entry.category);
            if let Some(remaining) = active.get_mut(id) {
                remaining.remove(index);
                if remaining.is_empty() {
                    active.remove(id);
                }
            }
        }

        let mut diagnostics = Vec::new();
        if last {
            let removal = remove_dependencies_for_deactivation(entry, &updated.style_dependencies);
            for warning in &removal.warnings {
                tracing::warn!(character_id = %character.id, %warning, "Style slot dropped");
            }
            diagnostics.extend(removal.warnings);
            updated.style_dependencies = clear_extended_taken(entry, &removal.dependencies);
        }
        sync_increasable_dependencies(&self.rules, &mut updated, entry);
        self.ensure_still_satisfied(character, &updated, &entry.id)?;

        tracing::debug!(character_id = %character.id, entry = %entry.id, index, "Deactivated entry");
        Ok(self.commit(updated, diagnostics))
    }

    /// Moves the instance at `index` of entry `id` to `tier`.
    pub fn set_tier(
        &self,
        character: &CharacterSnapshot,
        id: &str,
        index: usize,
        tier: u8,
    ) -> Result<ChangeOutcome, ActivationError> {
        let entry = self.entry(id)?;
        let current = character
            .instances(id)
            .get(index)
            .cloned()
            .ok_or_else(|| ActivationError::NotActive {
                id: entry.id.clone(),
                index,
            })?;
        validate_tier(entry, Some(tier))?;

        let mut changed = current.clone();
        changed.tier = Some(tier);

        let raising = tier > current.effective_tier();
        let diagnostics = if raising {
            self.check_prerequisites(entry, character, &changed, tier)?
        } else {
            Vec::new()
        };

        let before = activatable_cost(entry, &current).map_err(ActivationError::Cost)?;
        let after = activatable_cost(entry, &changed).map_err(ActivationError::Cost)?;
        self.ensure_affordable(character, entry, after - before)?;

        let mut updated = character.clone();
        if let Some(slot) = updated
            .activatables_mut(entry.category)
            .get_mut(id)
            .and_then(|instances| instances.get_mut(index))
        {
            *slot = changed;
        }
        sync_increasable_dependencies(&self.rules, &mut updated, entry);
        if !raising {
            self.ensure_still_satisfied(character, &updated, &entry.id)?;
        }

        tracing::debug!(character_id = %character.id, entry = %entry.id, tier, "Changed tier");
        Ok(self.commit(updated, diagnostics))
    }

    fn entry(&self, id: &str) -> Result<&ActivatableEntry, ActivationError> {
        self.rules
            .activatable(id)
            .ok_or_else(|| ActivationError::UnknownEntry(EntryId::from(id)))
    }

    fn commit(&self, updated: CharacterSnapshot, diagnostics: Vec<Diagnostic>) -> ChangeOutcome {
        let refresh = self.ledger.refresh(&updated);
        ChangeOutcome::from_refresh(updated, diagnostics, refresh)
    }

    /// Entry and selection prerequisites at `tier`; returns the diagnostics.
    fn check_prerequisites(
        &self,
        entry: &ActivatableEntry,
        character: &CharacterSnapshot,
        instance: &ActiveObject,
        tier: u8,
    ) -> Result<Vec<Diagnostic>, ActivationError> {
        let evaluator = PrerequisiteEvaluator::new(&self.rules, character);
        let option = instance
            .sid
            .as_ref()
            .and_then(|sid| entry.select_option(sid));

        let mut diagnostics = Vec::new();
        let mut unmet = Vec::new();
        for tree in std::iter::once(&entry.prerequisites).chain(option.map(|o| &o.prerequisites)) {
            let evaluation = evaluator.evaluate_with_diagnostics(tree, tier);
            diagnostics.extend(evaluation.diagnostics);
            if !evaluation.satisfied {
                unmet.extend(evaluator.unmet(tree, tier).into_iter().cloned());
            }
        }

        if unmet.is_empty() {
            Ok(diagnostics)
        } else {
            Err(ActivationError::PrerequisitesNotMet {
                id: entry.id.clone(),
                unmet,
            })
        }
    }

    fn validate_selection(
        &self,
        entry: &ActivatableEntry,
        character: &CharacterSnapshot,
        instance: &ActiveObject,
    ) -> Result<(), ActivationError> {
        let invalid = || ActivationError::InvalidSelection {
            id: entry.id.clone(),
            sid: instance.sid.clone(),
        };

        let knowledge_kind = match entry.id.as_str() {
            well_known::PROPERTY_KNOWLEDGE => Some(IncreasableKind::Spell),
            well_known::ASPECT_KNOWLEDGE => Some(IncreasableKind::LiturgicalChant),
            _ => None,
        };
        if let Some(kind) = knowledge_kind {
            let number = instance
                .sid
                .as_ref()
                .and_then(SelectionId::as_number)
                .ok_or_else(invalid)?;
            let unlocked = u32::try_from(number).is_ok_and(|number| {
                PropertyTally::for_kind(&self.rules, character, kind).is_available(number)
            });
            if !unlocked || character.known_numbers(entry.id.as_str()).contains(&number) {
                return Err(invalid());
            }
            return Ok(());
        }

        if entry.select_options.is_empty() {
            return Ok(());
        }
        match instance.sid.as_ref() {
            Some(sid) if entry.select_option(sid).is_some() => Ok(()),
            _ => Err(invalid()),
        }
    }

    /// Fails when a change that takes `cost` AP does not fit the budget.
    ///
    /// Disadvantages grant AP, so their cost counts the other way round.
    fn ensure_affordable(
        &self,
        character: &CharacterSnapshot,
        entry: &ActivatableEntry,
        cost: i32,
    ) -> Result<(), ActivationError> {
        let taken = match entry.category {
            ActivatableCategory::Disadvantage => -cost,
            _ => cost,
        };
        if taken <= 0
            || entry.no_max_ap_influence
            || self.ignore_ap_limit
            || character.rules.ignore_ap_limit
        {
            return Ok(());
        }
        let ledger = self.ledger.ledger_for_snapshot(character);
        match over_budget(&ledger, taken) {
            Some(available) => Err(ActivationError::InsufficientAp {
                cost: taken,
                available,
            }),
            None => Ok(()),
        }
    }

    /// Fails if an entry that was valid before the change no longer is.
    fn ensure_still_satisfied(
        &self,
        before: &CharacterSnapshot,
        after: &CharacterSnapshot,
        changed: &EntryId,
    ) -> Result<(), ActivationError> {
        let was = PrerequisiteEvaluator::new(&self.rules, before);
        let now = PrerequisiteEvaluator::new(&self.rules, after);

        let activatables = ActivatableCategory::ALL.into_iter().flat_map(|category| {
            after.activatables(category).iter().flat_map(|(id, instances)| {
                instances
                    .iter()
                    .map(move |instance| (id, instance.effective_tier()))
            })
        });
        for (id, tier) in activatables {
            let Some(entry) = self.rules.activatable(id.as_str()) else {
                continue;
            };
            if was.evaluate(&entry.prerequisites, tier) && !now.evaluate(&entry.prerequisites, tier) {
                return Err(ActivationError::StillRequired {
                    id: changed.clone(),
                    required_by: id.clone(),
                });
            }
        }

        for kind in [IncreasableKind::Spell, IncreasableKind::LiturgicalChant] {
            for id in after.increasables(kind).keys() {
                let Some(entry) = self.rules.increasable(id.as_str()) else {
                    continue;
                };
                if was.evaluate(&entry.prerequisites, 1) && !now.evaluate(&entry.prerequisites, 1) {
                    return Err(ActivationError::StillRequired {
                        id: changed.clone(),
                        required_by: id.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn validate_tier(entry: &ActivatableEntry, requested: Option<u8>) -> Result<u8, ActivationError> {
    let max = entry.tiers.unwrap_or(1);
    let tier = requested.unwrap_or(1);
    if (1..=max).contains(&tier) {
        Ok(tier)
    } else {
        Err(ActivationError::InvalidTier {
            id: entry.id.clone(),
            tier,
            max,
        })
    }
}

/// Re-records the minimum values `entry` puts on increasables through its
/// prerequisites at the highest active tier.
fn sync_increasable_dependencies(
    rules: &RuleData,
    character: &mut CharacterSnapshot,
    entry: &ActivatableEntry,
) {
    for kind in IncreasableKind::ALL {
        for state in character.increasables_mut(kind).values_mut() {
            state.dependencies.retain(|dep| dep.origin != entry.id);
        }
    }

    let Some(tier) = character
        .instances(entry.id.as_str())
        .iter()
        .map(ActiveObject::effective_tier)
        .max()
    else {
        return;
    };

    let floors: Vec<(EntryId, i32)> = entry
        .prerequisites
        .applicable(tier)
        .filter_map(|requirement| match requirement {
            Requirement::Increasable { id, value } => Some((id.clone(), *value)),
            _ => None,
        })
        .collect();

    for (id, value) in floors {
        let Some(target) = rules.increasable(id.as_str()) else {
            continue;
        };
        let kind = target.kind;
        let states = character.increasables_mut(kind);
        if kind.needs_activation() && !states.contains_key(&id) {
            continue;
        }
        states
            .entry(id)
            .or_insert_with(|| IncreasableState::at(kind.base_value()))
            .dependencies
            .push(IncreasableDependency::new(entry.id.clone(), value));
    }
}
