//! Append-only ledger.
//!
//! This module implements:
//! - Ledger entries (signed coin amounts per balance-affecting event)
//! - Error types for every ledger operation
//! - Reconciliation of a wallet against its entries

pub mod entry;
pub mod error;

pub use entry::{LedgerEntry, LedgerEntryKind};
pub use error::LedgerError;

/// Sums the signed amounts of a set of entries.
///
/// Returns `None` on overflow, which a consistent ledger never reaches.
#[must_use]
pub fn ledger_total<'a>(entries: impl IntoIterator<Item = &'a LedgerEntry>) -> Option<i64> {
    entries
        .into_iter()
        .try_fold(0i64, |acc, entry| acc.checked_add(entry.amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use inkwell_shared::types::{ContentId, UserId};

    #[test]
    fn test_ledger_total_sums_signed_amounts() {
        let user = UserId::new();
        let now = Utc::now();
        let entries = [
            LedgerEntry::purchase(user, 150, &"order-1".into(), now),
            LedgerEntry::unlock(user, 100, &ContentId::new("c1"), now),
            LedgerEntry::download(user, &ContentId::new("c1"), now),
        ];
        assert_eq!(ledger_total(&entries), Some(50));
    }

    #[test]
    fn test_ledger_total_empty_is_zero() {
        assert_eq!(ledger_total(&[]), Some(0));
    }

    #[test]
    fn test_ledger_total_detects_overflow() {
        let user = UserId::new();
        let now = Utc::now();
        let entries = [
            LedgerEntry::purchase(user, i64::MAX, &"a".into(), now),
            LedgerEntry::purchase(user, 1, &"b".into(), now),
        ];
        assert_eq!(ledger_total(&entries), None);
    }
}
