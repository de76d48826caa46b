//! Prerequisite evaluation
//!
//! Checks a [`PrerequisiteTree`] against a [`CharacterSnapshot`]. The
//! evaluator is a pure view over rule data and one character: it never
//! mutates either, and content errors (ids that do not resolve) make a
//! requirement unsatisfied and are reported as diagnostics.

use std::collections::BTreeMap;

use crate::entities::{
    ActivatableEntry, ActiveObject, CharacterSnapshot, NamedEntry, RuleData,
    BLESSED_TRADITION_GROUP, MAGICAL_TRADITION_GROUP,
};
use crate::value_objects::{
    Diagnostic, PrerequisiteTree, Requirement, SelectionId, TraditionCategory,
};
use crate::well_known;
use crate::EntryId;

/// Outcome of evaluating a tree, with the content problems found on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub satisfied: bool,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct PrerequisiteEvaluator<'a> {
    rules: &'a RuleData,
    character: &'a CharacterSnapshot,
}

impl<'a> PrerequisiteEvaluator<'a> {
    pub fn new(rules: &'a RuleData, character: &'a CharacterSnapshot) -> Self {
        Self { rules, character }
    }

    /// True if every requirement applying at `at_tier` holds.
    pub fn evaluate(&self, tree: &PrerequisiteTree, at_tier: u8) -> bool {
        self.evaluate_with_diagnostics(tree, at_tier).satisfied
    }

    /// Like [`Self::evaluate`], but checks every requirement so that all
    /// missing references are reported.
    pub fn evaluate_with_diagnostics(&self, tree: &PrerequisiteTree, at_tier: u8) -> Evaluation {
        let mut diagnostics = Vec::new();
        let mut satisfied = true;
        for requirement in tree.applicable(at_tier) {
            satisfied &= self.check(requirement, &mut diagnostics);
        }
        Evaluation {
            satisfied,
            diagnostics,
        }
    }

    pub fn is_satisfied(&self, requirement: &Requirement) -> bool {
        self.check(requirement, &mut Vec::new())
    }

    /// Requirements applying at `at_tier` that do not hold.
    pub fn unmet<'t>(&self, tree: &'t PrerequisiteTree, at_tier: u8) -> Vec<&'t Requirement> {
        tree.applicable(at_tier)
            .filter(|requirement| !self.is_satisfied(requirement))
            .collect()
    }

    fn check(&self, requirement: &Requirement, diagnostics: &mut Vec<Diagnostic>) -> bool {
        match requirement {
            Requirement::Race { ids, negated } => self
                .membership(ids, &self.rules.races, self.character.race.as_ref(), diagnostics)
                .is_some_and(|matched| matched != *negated),
            Requirement::Culture { ids } => self
                .membership(ids, &self.rules.cultures, self.character.culture.as_ref(), diagnostics)
                .unwrap_or(false),
            Requirement::SocialStatus { ids } => self
                .membership(
                    ids,
                    &self.rules.social_statuses,
                    self.character.social_status.as_ref(),
                    diagnostics,
                )
                .unwrap_or(false),
            Requirement::Sex { value } => self.character.sex == Some(*value),
            Requirement::Pact {
                category,
                domain,
                level,
            } => self.character.pact.is_some_and(|pact| {
                pact.category == *category
                    && domain
                        .as_ref()
                        .map_or(true, |domains| domains.contains(&pact.domain))
                    && level.map_or(true, |level| pact.level >= level)
            }),
            Requirement::PrimaryAttribute { category, value } => {
                self.primary_attribute_value(*category)
                    .is_some_and(|current| current >= *value)
            }
            Requirement::Attribute { id, value } => {
                if !self.rules.has_attribute(id.as_str()) {
                    diagnostics.push(Diagnostic::missing(id.clone(), "attribute requirement"));
                    return false;
                }
                self.character.attribute_value(id.as_str()) >= *value
            }
            Requirement::Increasable { id, value } => match self.rules.increasable(id.as_str()) {
                Some(entry) => self
                    .character
                    .increasable_value(entry.kind, id.as_str())
                    .is_some_and(|current| current >= *value),
                None => {
                    diagnostics.push(Diagnostic::missing(id.clone(), "increasable requirement"));
                    false
                }
            },
            Requirement::Activatable {
                id,
                active,
                sid,
                sid2,
                tier,
            } => {
                if self.rules.activatable(id.as_str()).is_none() {
                    diagnostics.push(Diagnostic::missing(id.clone(), "activatable requirement"));
                    return false;
                }
                let matched = self
                    .character
                    .instances(id.as_str())
                    .iter()
                    .any(|instance| instance_matches(instance, sid.as_ref(), sid2.as_ref(), *tier));
                matched == *active
            }
            Requirement::ActivatableMultiEntry { ids, active, sid } => {
                let known: Vec<&EntryId> = ids
                    .iter()
                    .filter(|id| {
                        let found = self.rules.activatable(id.as_str()).is_some();
                        if !found {
                            diagnostics.push(Diagnostic::missing((*id).clone(), "activatable requirement"));
                        }
                        found
                    })
                    .collect();
                if known.is_empty() {
                    return false;
                }
                let matched = known.iter().any(|id| {
                    self.character
                        .instances(id.as_str())
                        .iter()
                        .any(|instance| instance_matches(instance, sid.as_ref(), None, None))
                });
                matched == *active
            }
            Requirement::ActivatableMultiSelect { id, sids, active } => {
                if self.rules.activatable(id.as_str()).is_none() {
                    diagnostics.push(Diagnostic::missing(id.clone(), "activatable requirement"));
                    return false;
                }
                let matched = self.character.instances(id.as_str()).iter().any(|instance| {
                    instance
                        .sid
                        .as_ref()
                        .is_some_and(|selected| sids.contains(selected))
                });
                matched == *active
            }
            Requirement::Rcp => true,
        }
    }

    /// Whether `current` is one of `ids`, or `None` if no id resolves.
    fn membership(
        &self,
        ids: &[EntryId],
        table: &BTreeMap<EntryId, NamedEntry>,
        current: Option<&EntryId>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<bool> {
        let mut any_known = false;
        for id in ids {
            if table.contains_key(id) {
                any_known = true;
            } else {
                diagnostics.push(Diagnostic::missing(id.clone(), "selection requirement"));
            }
        }
        any_known.then(|| current.is_some_and(|current| ids.contains(current)))
    }

    /// Highest primary attribute among the character's active traditions.
    fn primary_attribute_value(&self, category: TraditionCategory) -> Option<i32> {
        let group = match category {
            TraditionCategory::Magical => MAGICAL_TRADITION_GROUP,
            TraditionCategory::Blessed => BLESSED_TRADITION_GROUP,
        };
        self.character
            .special_abilities
            .keys()
            .filter_map(|id| self.rules.activatable(id.as_str()))
            .filter(|entry| entry.gr == group)
            .filter_map(|entry| entry.tradition.as_ref()?.primary_attribute.as_ref())
            .map(|attribute| self.character.attribute_value(attribute.as_str()))
            .max()
    }
}

fn instance_matches(
    instance: &ActiveObject,
    sid: Option<&SelectionId>,
    sid2: Option<&SelectionId>,
    tier: Option<u8>,
) -> bool {
    sid.map_or(true, |sid| instance.sid.as_ref() == Some(sid))
        && sid2.map_or(true, |sid2| instance.sid2.as_ref() == Some(sid2))
        && tier.map_or(true, |tier| instance.effective_tier() >= tier)
}

/// Requirements that apply regardless of tier (plain and tier 1).
pub fn first_tier_requirements(tree: &PrerequisiteTree) -> Vec<&Requirement> {
    tree.first_tier()
}

/// Whether an entry presupposes being blessed or a spellcaster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Classification {
    pub blessed: bool,
    pub magical: bool,
}

/// Classifies an entry by its first-tier requirements on Blessed One and
/// Spellcaster.
pub fn classify(entry: &ActivatableEntry) -> Classification {
    first_tier_requirements(&entry.prerequisites)
        .into_iter()
        .fold(Classification::default(), |acc, requirement| Classification {
            blessed: acc.blessed || requirement.requires_active(well_known::BLESSED),
            magical: acc.magical || requirement.requires_active(well_known::SPELLCASTER),
        })
}
