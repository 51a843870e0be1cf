//! `SeaORM` entity definitions.

pub mod accounts;
pub mod content_unlocks;
pub mod contents;
pub mod idempotency_locks;
pub mod ledger_entries;
