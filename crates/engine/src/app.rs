//! Application state and composition.

use std::sync::Arc;

use heroforge_domain::RuleData;

use crate::infrastructure::config::EngineConfig;
use crate::infrastructure::ports::{ApCacheStore, CharacterStatePort, ClockPort};
use crate::use_cases::{ActivationUseCases, IncreasableUseCases, LedgerService};

/// Main application state.
///
/// Holds the rule data, the ledger cache and the use cases built on it.
pub struct App {
    pub rules: Arc<RuleData>,
    pub characters: Arc<dyn CharacterStatePort>,
    pub ledger: Arc<LedgerService>,
    pub use_cases: UseCases,
}

/// Container for all use cases.
pub struct UseCases {
    pub activation: ActivationUseCases,
    pub increasable: IncreasableUseCases,
}

impl App {
    pub fn new(
        config: &EngineConfig,
        rules: Arc<RuleData>,
        characters: Arc<dyn CharacterStatePort>,
        store: Arc<dyn ApCacheStore>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        let ledger = Arc::new(
            LedgerService::new(rules.clone(), characters.clone(), store, clock)
                .with_persistence(config.persist_cache),
        );

        let use_cases = UseCases {
            activation: ActivationUseCases::new(
                rules.clone(),
                ledger.clone(),
                config.ignore_ap_limit,
            ),
            increasable: IncreasableUseCases::new(
                rules.clone(),
                ledger.clone(),
                config.ignore_ap_limit,
            ),
        };

        Self {
            rules,
            characters,
            ledger,
            use_cases,
        }
    }
}
