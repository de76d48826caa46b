//! Prerequisite trees: tier-keyed sets of requirements.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Requirement;

/// Key of one requirement set in a [`PrerequisiteTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TierKey {
    /// Applies at every tier
    Plain,
    /// Applies from the given tier onward
    From(u8),
}

impl TierKey {
    pub fn applies_at(self, tier: u8) -> bool {
        match self {
            Self::Plain => true,
            Self::From(from) => from <= tier,
        }
    }
}

/// Requirements of an entry, grouped by the tier they start to apply at.
///
/// Requirements accumulate: at tier N every set keyed `Plain` or
/// `From(n)` with `n <= N` applies, and all of them are ANDed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<TierGroup>", into = "Vec<TierGroup>")]
pub struct PrerequisiteTree(BTreeMap<TierKey, Vec<Requirement>>);

impl PrerequisiteTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tree with a single tier-independent set.
    pub fn plain(requirements: Vec<Requirement>) -> Self {
        Self::new().with(TierKey::Plain, requirements)
    }

    pub fn with(mut self, key: TierKey, requirements: Vec<Requirement>) -> Self {
        self.0.entry(key).or_default().extend(requirements);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }

    /// All requirements that apply at `tier`.
    pub fn applicable(&self, tier: u8) -> impl Iterator<Item = &Requirement> {
        self.0
            .iter()
            .filter(move |(key, _)| key.applies_at(tier))
            .flat_map(|(_, requirements)| requirements.iter())
    }

    /// The unconditional subset: plain requirements and those from tier 1.
    pub fn first_tier(&self) -> Vec<&Requirement> {
        self.applicable(1).collect()
    }
}

/// Wire shape of one tier set; `from_tier` absent means plain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    from_tier: Option<u8>,
    requirements: Vec<Requirement>,
}

impl From<Vec<TierGroup>> for PrerequisiteTree {
    fn from(groups: Vec<TierGroup>) -> Self {
        groups.into_iter().fold(Self::new(), |tree, group| {
            let key = group.from_tier.map_or(TierKey::Plain, TierKey::From);
            tree.with(key, group.requirements)
        })
    }
}

impl From<PrerequisiteTree> for Vec<TierGroup> {
    fn from(tree: PrerequisiteTree) -> Self {
        tree.0
            .into_iter()
            .map(|(key, requirements)| TierGroup {
                from_tier: match key {
                    TierKey::Plain => None,
                    TierKey::From(tier) => Some(tier),
                },
                requirements,
            })
            .collect()
    }
}
