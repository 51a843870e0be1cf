//! Ledger entry domain types.

use chrono::{DateTime, NaiveDate, Utc};
use inkwell_shared::types::{ContentId, ExternalEventId, LedgerEntryId, UserId};
use serde::{Deserialize, Serialize};

/// Kind of balance-affecting event a ledger entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryKind {
    /// Coins entering the wallet: paid purchases and check-in rewards.
    PurchaseCurrency,
    /// Coins spent on a permanent content entitlement.
    UnlockContent,
    /// Zero-amount audit note for a content download.
    DownloadContent,
    /// Operator correction, or an operator audit note when zero.
    AdminAdjustment,
}

impl LedgerEntryKind {
    /// Returns the stable storage name of this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PurchaseCurrency => "purchase_currency",
            Self::UnlockContent => "unlock_content",
            Self::DownloadContent => "download_content",
            Self::AdminAdjustment => "admin_adjustment",
        }
    }
}

impl std::fmt::Display for LedgerEntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LedgerEntryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "purchase_currency" => Ok(Self::PurchaseCurrency),
            "unlock_content" => Ok(Self::UnlockContent),
            "download_content" => Ok(Self::DownloadContent),
            "admin_adjustment" => Ok(Self::AdminAdjustment),
            _ => Err(format!("Unknown ledger entry kind: {s}")),
        }
    }
}

/// One immutable record of a balance-affecting event.
///
/// `amount` is signed: positive credits the wallet, negative debits it and
/// zero marks a non-monetary audit note. The sum of a user's amounts is
/// always that user's balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier for this entry.
    pub id: LedgerEntryId,
    /// Wallet owner.
    pub user_id: UserId,
    /// Signed coin amount.
    pub amount: i64,
    /// Event kind.
    pub kind: LedgerEntryKind,
    /// Content id, order id or operator id the event refers to.
    pub related_entity_id: Option<String>,
    /// Human readable description.
    pub description: String,
    /// When the entry was written.
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    fn new(
        user_id: UserId,
        amount: i64,
        kind: LedgerEntryKind,
        related_entity_id: Option<String>,
        description: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: LedgerEntryId::new(),
            user_id,
            amount,
            kind,
            related_entity_id,
            description,
            created_at,
        }
    }

    /// Credit for a verified payment capture.
    #[must_use]
    pub fn purchase(
        user_id: UserId,
        amount: i64,
        order_id: &ExternalEventId,
        now: DateTime<Utc>,
    ) -> Self {
        Self::new(
            user_id,
            amount,
            LedgerEntryKind::PurchaseCurrency,
            Some(order_id.to_string()),
            format!("Purchased {amount} coins (order {order_id})"),
            now,
        )
    }

    /// Credit for a daily check-in claim.
    #[must_use]
    pub fn check_in_reward(
        user_id: UserId,
        reward: i64,
        streak: u32,
        business_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Self {
        Self::new(
            user_id,
            reward,
            LedgerEntryKind::PurchaseCurrency,
            Some(format!("check-in:{business_date}")),
            format!("Daily check-in reward, day {streak}"),
            now,
        )
    }

    /// Debit for a content unlock.
    #[must_use]
    pub fn unlock(user_id: UserId, cost: i64, content_id: &ContentId, now: DateTime<Utc>) -> Self {
        Self::new(
            user_id,
            -cost,
            LedgerEntryKind::UnlockContent,
            Some(content_id.to_string()),
            format!("Unlocked content {content_id}"),
            now,
        )
    }

    /// Audit note for a content download.
    #[must_use]
    pub fn download(user_id: UserId, content_id: &ContentId, now: DateTime<Utc>) -> Self {
        Self::new(
            user_id,
            0,
            LedgerEntryKind::DownloadContent,
            Some(content_id.to_string()),
            format!("Downloaded content {content_id}"),
            now,
        )
    }

    /// Operator balance correction.
    #[must_use]
    pub fn admin_adjustment(
        user_id: UserId,
        delta: i64,
        reason: &str,
        operator: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        Self::new(
            user_id,
            delta,
            LedgerEntryKind::AdminAdjustment,
            Some(operator.to_string()),
            format!("Admin adjustment: {reason}"),
            now,
        )
    }

    /// Operator audit note for an entitlement revocation.
    #[must_use]
    pub fn revocation(
        user_id: UserId,
        content_id: &ContentId,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Self {
        Self::new(
            user_id,
            0,
            LedgerEntryKind::AdminAdjustment,
            Some(content_id.to_string()),
            format!("Entitlement {content_id} revoked: {reason}"),
            now,
        )
    }

    /// Returns true for zero-amount audit notes.
    #[must_use]
    pub const fn is_audit_note(&self) -> bool {
        self.amount == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_kind_roundtrip() {
        for kind in [
            LedgerEntryKind::PurchaseCurrency,
            LedgerEntryKind::UnlockContent,
            LedgerEntryKind::DownloadContent,
            LedgerEntryKind::AdminAdjustment,
        ] {
            assert_eq!(LedgerEntryKind::from_str(kind.as_str()).unwrap(), kind);
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
        assert!(LedgerEntryKind::from_str("refund").is_err());
    }

    #[test]
    fn test_unlock_is_a_debit() {
        let content = ContentId::new("chapter-1");
        let entry = LedgerEntry::unlock(UserId::new(), 100, &content, now());
        assert_eq!(entry.amount, -100);
        assert_eq!(entry.kind, LedgerEntryKind::UnlockContent);
        assert_eq!(entry.related_entity_id.as_deref(), Some("chapter-1"));
    }

    #[test]
    fn test_check_in_description_carries_day_index() {
        let date = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let entry = LedgerEntry::check_in_reward(UserId::new(), 30, 3, date, now());
        assert_eq!(entry.amount, 30);
        assert_eq!(entry.kind, LedgerEntryKind::PurchaseCurrency);
        assert!(entry.description.contains("day 3"));
        assert_eq!(entry.related_entity_id.as_deref(), Some("check-in:2026-05-01"));
    }

    #[test]
    fn test_admin_adjustment_embeds_reason() {
        let operator = UserId::new();
        let entry = LedgerEntry::admin_adjustment(UserId::new(), -50, "chargeback", operator, now());
        assert_eq!(entry.amount, -50);
        assert!(entry.description.contains("chargeback"));
        assert_eq!(entry.related_entity_id, Some(operator.to_string()));
    }

    #[test]
    fn test_notes_have_zero_amount() {
        let content = ContentId::new("c");
        assert!(LedgerEntry::download(UserId::new(), &content, now()).is_audit_note());
        assert!(LedgerEntry::revocation(UserId::new(), &content, "abuse", now()).is_audit_note());
        assert!(!LedgerEntry::purchase(UserId::new(), 10, &"o".into(), now()).is_audit_note());
    }
}
