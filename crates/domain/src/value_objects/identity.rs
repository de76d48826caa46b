//! Personal facts about a character that requirements can test.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

/// A pact with a supernatural being (fey, demon, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pact {
    /// Kind of being the pact is made with.
    pub category: u32,
    /// Circle or court within the category.
    pub domain: u32,
    pub level: u8,
}

/// Which tradition a primary attribute requirement refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraditionCategory {
    Magical,
    Blessed,
}
