//! HeroForge Engine library.
//!
//! Side-effecting half of HeroForge: caches AP ledgers, persists them and
//! runs character changes through the domain rules.
//!
//! ## Structure
//!
//! - `use_cases/` - Ledger cache service, activation and value changes
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `app` - Application composition

pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
