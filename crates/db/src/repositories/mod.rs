//! Repository abstractions for data access.
//!
//! Repositories hide the `SeaORM` implementation details from the rest of
//! the application. The ledger store implements the engine's store seam.

pub mod content;
pub mod ledger;

pub use content::ContentRepository;
pub use ledger::PgLedgerStore;
