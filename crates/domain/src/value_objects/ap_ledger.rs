//! Adventure point ledger: AP spent per category.

use serde::{Deserialize, Serialize};

/// AP of an advantage or disadvantage bucket, tracked twice.
///
/// `display` counts every entry; `budget` leaves out entries that do not
/// count against the AP limit. Serialized as a bare number when both are
/// equal and as `[display, budget]` otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SpentPairRepr", into = "SpentPairRepr")]
pub struct SpentPair {
    pub display: i32,
    pub budget: i32,
}

impl SpentPair {
    pub fn new(display: i32, budget: i32) -> Self {
        Self { display, budget }
    }

    pub fn uniform(value: i32) -> Self {
        Self::new(value, value)
    }

    pub fn add(&mut self, cost: i32, counts_for_budget: bool) {
        self.display = self.display.saturating_add(cost);
        if counts_for_budget {
            self.budget = self.budget.saturating_add(cost);
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpentPairRepr {
    Single(i32),
    Pair(i32, i32),
}

impl From<SpentPairRepr> for SpentPair {
    fn from(repr: SpentPairRepr) -> Self {
        match repr {
            SpentPairRepr::Single(value) => Self::uniform(value),
            SpentPairRepr::Pair(display, budget) => Self::new(display, budget),
        }
    }
}

impl From<SpentPair> for SpentPairRepr {
    fn from(pair: SpentPair) -> Self {
        if pair.display == pair.budget {
            Self::Single(pair.display)
        } else {
            Self::Pair(pair.display, pair.budget)
        }
    }
}

/// AP spent by one character, per category.
///
/// Disadvantage buckets hold AP gained and enter `spent` negatively. The
/// magical and blessed buckets are subsets of their "all" bucket and are
/// never added a second time. `spent` always equals [`Self::bucket_sum`].
///
/// `available` and the activatable buckets may be absent from a cached
/// entry and read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApLedger {
    pub spent: i32,
    #[serde(default)]
    pub available: Option<i32>,
    pub spent_on_attributes: i32,
    pub spent_on_skills: i32,
    pub spent_on_combat_techniques: i32,
    pub spent_on_spells: i32,
    pub spent_on_liturgical_chants: i32,
    pub spent_on_cantrips: i32,
    pub spent_on_blessings: i32,
    pub spent_on_energies: i32,
    #[serde(default)]
    pub spent_on_advantages: SpentPair,
    #[serde(default)]
    pub spent_on_magical_advantages: SpentPair,
    #[serde(default)]
    pub spent_on_blessed_advantages: SpentPair,
    #[serde(default)]
    pub spent_on_disadvantages: SpentPair,
    #[serde(default)]
    pub spent_on_magical_disadvantages: SpentPair,
    #[serde(default)]
    pub spent_on_blessed_disadvantages: SpentPair,
    #[serde(default)]
    pub spent_on_special_abilities: SpentPair,
}

impl ApLedger {
    /// Ledger of a character with nothing bought.
    pub fn empty(total_budget: Option<i32>) -> Self {
        Self {
            available: total_budget,
            ..Self::default()
        }
    }

    fn flat_sum(&self) -> i32 {
        [
            self.spent_on_attributes,
            self.spent_on_skills,
            self.spent_on_combat_techniques,
            self.spent_on_spells,
            self.spent_on_liturgical_chants,
            self.spent_on_cantrips,
            self.spent_on_blessings,
            self.spent_on_energies,
        ]
        .into_iter()
        .fold(0, i32::saturating_add)
    }

    /// Total shown to the user: every bucket, disadvantages subtracted.
    pub fn bucket_sum(&self) -> i32 {
        self.flat_sum()
            .saturating_add(self.spent_on_special_abilities.display)
            .saturating_add(self.spent_on_advantages.display)
            .saturating_sub(self.spent_on_disadvantages.display)
    }

    /// Total checked against the AP budget.
    pub fn budget_sum(&self) -> i32 {
        self.flat_sum()
            .saturating_add(self.spent_on_special_abilities.budget)
            .saturating_add(self.spent_on_advantages.budget)
            .saturating_sub(self.spent_on_disadvantages.budget)
    }

    /// Fills in `spent` and `available` from the buckets.
    pub fn finalize(mut self, total_budget: Option<i32>) -> Self {
        self.spent = self.bucket_sum();
        self.available = total_budget.map(|budget| budget.saturating_sub(self.budget_sum()));
        self
    }

    /// True if `cost` more AP fit into the budget (always true without one).
    pub fn can_afford(&self, cost: i32) -> bool {
        self.available.map_or(true, |available| cost <= available)
    }
}
