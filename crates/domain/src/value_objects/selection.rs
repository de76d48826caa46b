use std::fmt;

use serde::{Deserialize, Serialize};

/// Selection made on an activatable instance (`sid` / `sid2`).
///
/// Content tables use numbers for fixed option lists and strings for
/// references to other entries or free text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectionId {
    Number(i64),
    Text(String),
}

impl SelectionId {
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Text(s) => Some(s),
        }
    }

    /// True if this selection names the given entry id.
    pub fn refers_to(&self, id: &str) -> bool {
        self.as_text() == Some(id)
    }
}

impl fmt::Display for SelectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for SelectionId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<u32> for SelectionId {
    fn from(value: u32) -> Self {
        Self::Number(i64::from(value))
    }
}

impl From<&str> for SelectionId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SelectionId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}
