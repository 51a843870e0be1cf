//! Idempotency locks for external events.
//!
//! A lock exists once per external event id. It is read and written inside
//! the same store transaction as the credit it guards, so its presence is
//! the only record that the event was applied.

use chrono::{DateTime, Utc};
use inkwell_shared::types::{ExternalEventId, UserId};
use serde::{Deserialize, Serialize};

/// Permanent marker that an external event was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdempotencyLock {
    /// External event id, e.g. a payment order id.
    pub event_id: ExternalEventId,
    /// Wallet that received the credit.
    pub user_id: UserId,
    /// Coins credited for the event.
    pub credited_amount: i64,
    /// When the event was applied.
    pub created_at: DateTime<Utc>,
}

impl IdempotencyLock {
    /// Creates the lock for a credit being applied now.
    #[must_use]
    pub const fn new(
        event_id: ExternalEventId,
        user_id: UserId,
        credited_amount: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id,
            user_id,
            credited_amount,
            created_at,
        }
    }
}
