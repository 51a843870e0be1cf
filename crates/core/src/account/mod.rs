//! Per-user wallet record.

mod types;

pub use types::{AccountRecord, AccountStatus};
