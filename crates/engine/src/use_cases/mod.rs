//! Use cases - User story orchestration.
//!
//! Each module covers one kind of change a character builder requests.
//! Use cases never commit character state: they return the updated snapshot
//! for the caller to store, and keep the ledger cache in step with it.

pub mod activation;
pub mod increasable;
pub mod ledger;

use heroforge_domain::{ApLedger, CharacterSnapshot, Diagnostic};

pub use activation::{ActivationError, ActivationUseCases};
pub use increasable::{IncreasableUseCases, IncreaseError};
pub use ledger::{
    CacheEntry, CacheOrigin, Invalidation, LedgerError, LedgerService, LoadStatus, PersistStatus,
    Refresh,
};

/// Updated snapshot for the caller to commit, with its recomputed ledger.
#[derive(Debug, Clone)]
pub struct ChangeOutcome {
    pub character: CharacterSnapshot,
    pub ledger: ApLedger,
    pub diagnostics: Vec<Diagnostic>,
    pub persist: PersistStatus,
}

impl ChangeOutcome {
    fn from_refresh(character: CharacterSnapshot, mut diagnostics: Vec<Diagnostic>, refresh: Refresh) -> Self {
        diagnostics.extend(refresh.entry.diagnostics);
        Self {
            character,
            ledger: refresh.entry.ledger,
            diagnostics,
            persist: refresh.persist,
        }
    }
}

/// AP still available when taking `cost` more would exceed the budget.
fn over_budget(ledger: &ApLedger, cost: i32) -> Option<i32> {
    (!ledger.can_afford(cost)).then(|| ledger.available.unwrap_or_default())
}
