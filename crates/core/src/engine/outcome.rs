//! Results of engine operations.
//!
//! Idempotent repeats are successes: an unlock of owned content, a replayed
//! payment and a second check-in on the same day all land here rather than
//! in [`LedgerError`](crate::ledger::LedgerError).

use chrono::{DateTime, NaiveDate, Utc};
use inkwell_shared::types::{LedgerEntryId, UserId};
use serde::Serialize;

/// Result of unlocking content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnlockOutcome {
    /// Balance after the operation.
    pub new_balance: i64,
    /// True when the user already owned the content and nothing changed.
    pub already_unlocked: bool,
    /// Debit entry, absent when nothing changed.
    pub entry_id: Option<LedgerEntryId>,
}

/// Result of crediting a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreditOutcome {
    /// Balance after the operation.
    pub new_balance: i64,
    /// True when the event was applied before and nothing changed.
    pub duplicate: bool,
    /// Coins credited by this call, `0` for duplicates.
    pub credited: i64,
    /// Credit entry, absent for duplicates.
    pub entry_id: Option<LedgerEntryId>,
}

/// Result of a daily check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CheckInOutcome {
    /// Reward paid.
    Claimed {
        /// Coins paid.
        reward: i64,
        /// Streak day reached.
        streak: u32,
        /// Balance after the reward.
        new_balance: i64,
        /// Business day the claim counts for.
        business_date: NaiveDate,
        /// Reward entry.
        entry_id: LedgerEntryId,
    },
    /// Today's reward was already claimed.
    AlreadyClaimed {
        /// Current streak day.
        streak: u32,
        /// First instant a new claim is accepted.
        next_window_start: DateTime<Utc>,
    },
}

impl CheckInOutcome {
    /// Returns true if a reward was paid.
    #[must_use]
    pub const fn is_claimed(&self) -> bool {
        matches!(self, Self::Claimed { .. })
    }
}

/// Whether a check-in is available and what it would pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckInStatus {
    /// True if today's reward is unclaimed.
    pub can_claim: bool,
    /// Current streak day.
    pub current_streak: u32,
    /// Streak day the next claim produces.
    pub next_streak: u32,
    /// Coins the next claim pays.
    pub next_reward: i64,
    /// Start of the next business day.
    pub next_window_start: DateTime<Utc>,
    /// Business day of "now".
    pub business_date: NaiveDate,
}

/// Result of an administrative balance correction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdjustmentOutcome {
    /// Balance after the correction.
    pub new_balance: i64,
    /// Adjustment entry.
    pub entry_id: LedgerEntryId,
}

/// Result of revoking an entitlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevocationOutcome {
    /// Entitlements left after the revocation.
    pub remaining_entitlements: usize,
    /// Audit note.
    pub entry_id: LedgerEntryId,
}

/// Result of recording a download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadOutcome {
    /// Audit note.
    pub entry_id: LedgerEntryId,
}

/// Balance compared against the ledger in one consistent read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    /// Wallet owner.
    pub user_id: UserId,
    /// Stored balance.
    pub balance: i64,
    /// Sum of the user's entry amounts.
    pub ledger_total: i64,
    /// True when both agree.
    pub consistent: bool,
}
