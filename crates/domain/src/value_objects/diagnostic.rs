use thiserror::Error;

use super::StyleFamily;
use crate::EntryId;

/// Non-fatal finding reported alongside a rules result.
///
/// Rules never fail on bad content: they fall back to the conservative
/// answer (unsatisfied, zero cost, freed slot) and report one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    /// An id in a requirement, dependency or cost table does not resolve
    #[error("missing reference to {id} in {context}")]
    MissingReference { id: EntryId, context: &'static str },

    /// A taken extended slot lost its style and no other slot could take it
    #[error("{family:?} slot taken by {marker} was freed when {origin} was removed")]
    InvalidDependencyState {
        family: StyleFamily,
        origin: EntryId,
        marker: EntryId,
    },
}

impl Diagnostic {
    pub fn missing(id: impl Into<EntryId>, context: &'static str) -> Self {
        Self::MissingReference {
            id: id.into(),
            context,
        }
    }

    pub fn is_missing_reference(&self) -> bool {
        matches!(self, Self::MissingReference { .. })
    }
}
