//! Value changes for skills, combat techniques, spells and liturgical chants.

use std::sync::Arc;

use heroforge_domain::rules::ActivationLimit;
use heroforge_domain::{
    CharacterSnapshot, EligibilityContext, EntryId, IncreasableEntry, IncreasableState,
    PrerequisiteEvaluator, RuleData,
};

use super::ledger::LedgerService;
use super::{over_budget, ChangeOutcome};

#[derive(Debug, thiserror::Error)]
pub enum IncreaseError {
    #[error("Unknown entry: {0}")]
    UnknownEntry(EntryId),
    #[error("{0} is not active")]
    NotActive(EntryId),
    #[error("{0} is already active")]
    AlreadyActive(EntryId),
    #[error("{0} is always active")]
    NotActivatable(EntryId),
    #[error("{id} is already at its maximum of {max}")]
    AtMaximum { id: EntryId, max: i32 },
    #[error("{id} is already at its minimum of {min}")]
    AtMinimum { id: EntryId, min: i32 },
    #[error("{id} must be lowered to its base before removal (currently {value})")]
    NotAtBase { id: EntryId, value: i32 },
    #[error("Prerequisites not met for {0}")]
    PrerequisitesNotMet(EntryId),
    #[error("Creation limit reached: {0:?}")]
    LimitReached(ActivationLimit),
    #[error("{0} is still required by another entry")]
    StillRequired(EntryId),
    #[error("Not enough AP: {cost} needed, {available} available")]
    InsufficientAp { cost: i32, available: i32 },
}

pub struct IncreasableUseCases {
    rules: Arc<RuleData>,
    ledger: Arc<LedgerService>,
    ignore_ap_limit: bool,
}

impl IncreasableUseCases {
    pub fn new(rules: Arc<RuleData>, ledger: Arc<LedgerService>, ignore_ap_limit: bool) -> Self {
        Self {
            rules,
            ledger,
            ignore_ap_limit,
        }
    }

    /// Raises `id` by one, if its maximum and the AP budget allow.
    pub fn increase(
        &self,
        character: &CharacterSnapshot,
        id: &str,
    ) -> Result<ChangeOutcome, IncreaseError> {
        let entry = self.entry(id)?;
        let eligibility = EligibilityContext::new(&self.rules, character);
        let current = eligibility
            .current_value(entry)
            .ok_or_else(|| IncreaseError::NotActive(entry.id.clone()))?;
        if !eligibility.is_increasable(entry) {
            return Err(IncreaseError::AtMaximum {
                id: entry.id.clone(),
                max: eligibility.max_value(entry),
            });
        }

        let cost = entry.ic.step_cost(current + 1);
        self.ensure_affordable(character, cost)?;

        let updated = with_value(character, entry, current + 1);
        tracing::debug!(character_id = %character.id, entry = %entry.id, value = current + 1, cost, "Increased");
        Ok(self.commit(updated))
    }

    /// Lowers `id` by one, if nothing holds it at its current value.
    pub fn decrease(
        &self,
        character: &CharacterSnapshot,
        id: &str,
    ) -> Result<ChangeOutcome, IncreaseError> {
        let entry = self.entry(id)?;
        let eligibility = EligibilityContext::new(&self.rules, character);
        let current = eligibility
            .current_value(entry)
            .ok_or_else(|| IncreaseError::NotActive(entry.id.clone()))?;
        if !eligibility.is_decreasable(entry) {
            return Err(IncreaseError::AtMinimum {
                id: entry.id.clone(),
                min: eligibility.min_value(entry),
            });
        }

        let updated = with_value(character, entry, current - 1);
        tracing::debug!(character_id = %character.id, entry = %entry.id, value = current - 1, "Decreased");
        Ok(self.commit(updated))
    }

    /// Activates a spell or liturgical chant at its base value.
    pub fn activate_spell(
        &self,
        character: &CharacterSnapshot,
        id: &str,
    ) -> Result<ChangeOutcome, IncreaseError> {
        let entry = self.entry(id)?;
        if !entry.kind.needs_activation() {
            return Err(IncreaseError::NotActivatable(entry.id.clone()));
        }
        if character.increasables(entry.kind).contains_key(id) {
            return Err(IncreaseError::AlreadyActive(entry.id.clone()));
        }

        let evaluation = PrerequisiteEvaluator::new(&self.rules, character)
            .evaluate_with_diagnostics(&entry.prerequisites, 1);
        if !evaluation.satisfied {
            return Err(IncreaseError::PrerequisitesNotMet(entry.id.clone()));
        }
        if let Some(limit) = EligibilityContext::new(&self.rules, character).activation_limit(entry) {
            return Err(IncreaseError::LimitReached(limit));
        }

        let cost = entry.ic.activation_cost();
        self.ensure_affordable(character, cost)?;

        let mut updated = character.clone();
        updated
            .increasables_mut(entry.kind)
            .insert(entry.id.clone(), IncreasableState::at(entry.kind.base_value()));
        tracing::debug!(character_id = %character.id, entry = %entry.id, cost, "Activated");

        let mut outcome = self.commit(updated);
        let mut diagnostics = evaluation.diagnostics;
        diagnostics.append(&mut outcome.diagnostics);
        outcome.diagnostics = diagnostics;
        Ok(outcome)
    }

    /// Removes a spell or liturgical chant that sits at its base value.
    pub fn deactivate_spell(
        &self,
        character: &CharacterSnapshot,
        id: &str,
    ) -> Result<ChangeOutcome, IncreaseError> {
        let entry = self.entry(id)?;
        if !entry.kind.needs_activation() {
            return Err(IncreaseError::NotActivatable(entry.id.clone()));
        }
        let state = character
            .increasables(entry.kind)
            .get(id)
            .ok_or_else(|| IncreaseError::NotActive(entry.id.clone()))?;
        if state.value > entry.kind.base_value() {
            return Err(IncreaseError::NotAtBase {
                id: entry.id.clone(),
                value: state.value,
            });
        }
        if EligibilityContext::new(&self.rules, character).has_binding_dependencies(entry) {
            return Err(IncreaseError::StillRequired(entry.id.clone()));
        }

        let mut updated = character.clone();
        updated.increasables_mut(entry.kind).remove(id);
        tracing::debug!(character_id = %character.id, entry = %entry.id, "Deactivated");
        Ok(self.commit(updated))
    }

    fn entry(&self, id: &str) -> Result<&IncreasableEntry, IncreaseError> {
        self.rules
            .increasable(id)
            .ok_or_else(|| IncreaseError::UnknownEntry(EntryId::from(id)))
    }

    fn commit(&self, updated: CharacterSnapshot) -> ChangeOutcome {
        let refresh = self.ledger.refresh(&updated);
        ChangeOutcome::from_refresh(updated, Vec::new(), refresh)
    }

    fn ensure_affordable(&self, character: &CharacterSnapshot, cost: i32) -> Result<(), IncreaseError> {
        if self.ignore_ap_limit || character.rules.ignore_ap_limit {
            return Ok(());
        }
        let ledger = self.ledger.ledger_for_snapshot(character);
        match over_budget(&ledger, cost) {
            Some(available) => Err(IncreaseError::InsufficientAp { cost, available }),
            None => Ok(()),
        }
    }
}

fn with_value(character: &CharacterSnapshot, entry: &IncreasableEntry, value: i32) -> CharacterSnapshot {
    let mut updated = character.clone();
    updated
        .increasables_mut(entry.kind)
        .entry(entry.id.clone())
        .or_insert_with(|| IncreasableState::at(entry.kind.base_value()))
        .value = value;
    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::in_memory::{InMemoryApCacheStore, InMemoryCharacterStore};
    use chrono::Utc;
    use heroforge_domain::{
        ActivatableCategory, ActivatableEntry, ActiveObject, CharacterId, ExperienceLevel,
        ImprovementCost, IncreasableDependency, IncreasableKind, PrerequisiteTree, Requirement,
        GENERAL_TRADITION,
    };

    fn rules() -> RuleData {
        let spell = |id: &str| {
            IncreasableEntry::new(id, id, IncreasableKind::Spell, ImprovementCost::C)
                .with_check(["ATTR_1", "ATTR_1", "ATTR_1"])
                .with_traditions(vec![GENERAL_TRADITION])
        };
        RuleData::new()
            .with_attribute("ATTR_1", "Courage")
            .with_experience_level(ExperienceLevel::average("EL_3"))
            .with_increasable(
                IncreasableEntry::new("TAL_1", "Climbing", IncreasableKind::Skill, ImprovementCost::B)
                    .with_check(["ATTR_1", "ATTR_1", "ATTR_1"]),
            )
            .with_increasable(spell("SPELL_1"))
            .with_increasable(spell("SPELL_2"))
            .with_increasable(
                spell("SPELL_3").with_prerequisites(PrerequisiteTree::plain(vec![
                    Requirement::active("SA_1"),
                ])),
            )
            .with_activatable(ActivatableEntry::special_ability("SA_1", "Magical Adept"))
    }

    fn use_cases(rules: RuleData, ignore_ap_limit: bool) -> IncreasableUseCases {
        let rules = Arc::new(rules);
        let ledger = LedgerService::new(
            rules.clone(),
            Arc::new(InMemoryCharacterStore::new()),
            Arc::new(InMemoryApCacheStore::new()),
            Arc::new(FixedClock(Utc::now())),
        );
        IncreasableUseCases::new(rules, Arc::new(ledger), ignore_ap_limit)
    }

    fn hero() -> CharacterSnapshot {
        CharacterSnapshot::new(CharacterId::new(), "Alrik", "EL_3")
            .with_total_ap(1100)
            .with_attribute("ATTR_1", 14)
    }

    #[test]
    fn increase_raises_by_one_and_charges_the_step() {
        let use_cases = use_cases(rules(), false);
        let character = hero().with_increasable(IncreasableKind::Skill, "TAL_1", 4);
        let before = use_cases.ledger.ledger_for_snapshot(&character);

        let outcome = use_cases.increase(&character, "TAL_1").expect("increase");

        assert_eq!(outcome.character.skills["TAL_1"].value, 5);
        assert_eq!(outcome.ledger.spent_on_skills, 10);
        assert_eq!(before.spent - outcome.ledger.spent, -2);
    }

    #[test]
    fn skills_not_yet_raised_start_at_base() {
        let use_cases = use_cases(rules(), false);

        let outcome = use_cases.increase(&hero(), "TAL_1").expect("increase");

        assert_eq!(outcome.character.skills["TAL_1"].value, 1);
    }

    #[test]
    fn experience_level_caps_creation() {
        let use_cases = use_cases(rules(), false);
        let character = hero().with_increasable(IncreasableKind::Skill, "TAL_1", 12);

        let err = use_cases.increase(&character, "TAL_1").expect_err("must fail");
        assert!(matches!(err, IncreaseError::AtMaximum { max: 12, .. }));
    }

    #[test]
    fn increase_needs_ap_unless_ignored() {
        let character = hero()
            .with_total_ap(98)
            .with_increasable(IncreasableKind::Skill, "TAL_1", 4);

        let err = use_cases(rules(), false)
            .increase(&character, "TAL_1")
            .expect_err("must fail");
        assert!(matches!(err, IncreaseError::InsufficientAp { cost: 2, .. }));

        assert!(use_cases(rules(), true).increase(&character, "TAL_1").is_ok());
    }

    #[test]
    fn decrease_stops_at_the_dependency_floor() {
        let use_cases = use_cases(rules(), false);
        let mut character = hero()
            .with_active(ActivatableCategory::SpecialAbility, "SA_1", ActiveObject::new())
            .with_increasable(IncreasableKind::Skill, "TAL_1", 5);
        if let Some(state) = character.skills.get_mut("TAL_1") {
            state.dependencies.push(IncreasableDependency::new("SA_1", 5));
        }

        let err = use_cases.decrease(&character, "TAL_1").expect_err("must fail");
        assert!(matches!(err, IncreaseError::AtMinimum { min: 5, .. }));

        let lowered = use_cases.decrease(&hero().with_increasable(IncreasableKind::Skill, "TAL_1", 5), "TAL_1");
        assert_eq!(lowered.expect("decrease").character.skills["TAL_1"].value, 4);
    }

    #[test]
    fn spells_must_be_activated_before_raising() {
        let use_cases = use_cases(rules(), false);

        let err = use_cases.increase(&hero(), "SPELL_1").expect_err("must fail");
        assert!(matches!(err, IncreaseError::NotActive(_)));

        let active = use_cases.activate_spell(&hero(), "SPELL_1").expect("activate");
        assert_eq!(active.character.spells["SPELL_1"].value, 0);
        assert_eq!(active.ledger.spent_on_spells, 3);

        let again = use_cases
            .activate_spell(&active.character, "SPELL_1")
            .expect_err("must fail");
        assert!(matches!(again, IncreaseError::AlreadyActive(_)));

        let skill = use_cases.activate_spell(&hero(), "TAL_1").expect_err("must fail");
        assert!(matches!(skill, IncreaseError::NotActivatable(_)));
    }

    #[test]
    fn spell_prerequisites_gate_activation() {
        let use_cases = use_cases(rules(), false);

        let err = use_cases.activate_spell(&hero(), "SPELL_3").expect_err("must fail");
        assert!(matches!(err, IncreaseError::PrerequisitesNotMet(_)));

        let adept = hero().with_active(ActivatableCategory::SpecialAbility, "SA_1", ActiveObject::new());
        assert!(use_cases.activate_spell(&adept, "SPELL_3").is_ok());
    }

    #[test]
    fn creation_limits_block_further_spells() {
        let mut level = ExperienceLevel::average("EL_3");
        level.max_spells_liturgies = 1;
        let use_cases = use_cases(rules().with_experience_level(level), false);
        let character = hero().with_increasable(IncreasableKind::Spell, "SPELL_1", 0);

        let err = use_cases
            .activate_spell(&character, "SPELL_2")
            .expect_err("must fail");
        assert!(matches!(
            err,
            IncreaseError::LimitReached(ActivationLimit::Spells { max: 1 })
        ));
    }

    #[test]
    fn spells_are_removed_only_at_base_and_unbound() {
        let use_cases = use_cases(rules(), false);

        let raised = hero().with_increasable(IncreasableKind::Spell, "SPELL_1", 2);
        let err = use_cases
            .deactivate_spell(&raised, "SPELL_1")
            .expect_err("must fail");
        assert!(matches!(err, IncreaseError::NotAtBase { value: 2, .. }));

        let mut bound = hero()
            .with_active(ActivatableCategory::SpecialAbility, "SA_1", ActiveObject::new())
            .with_increasable(IncreasableKind::Spell, "SPELL_1", 0);
        if let Some(state) = bound.spells.get_mut("SPELL_1") {
            state.dependencies.push(IncreasableDependency::new("SA_1", 0));
        }
        let err = use_cases
            .deactivate_spell(&bound, "SPELL_1")
            .expect_err("must fail");
        assert!(matches!(err, IncreaseError::StillRequired(_)));

        let free = hero().with_increasable(IncreasableKind::Spell, "SPELL_1", 0);
        let outcome = use_cases.deactivate_spell(&free, "SPELL_1").expect("deactivate");
        assert!(outcome.character.spells.is_empty());
        assert_eq!(outcome.ledger.spent_on_spells, 0);
    }
}
