//! Account record types.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use inkwell_shared::types::{ContentId, UserId};
use serde::{Deserialize, Serialize};

/// Gate on mutating operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    /// Normal operation.
    #[default]
    Active,
    /// Temporarily blocked by an operator.
    Suspended,
    /// Permanently blocked.
    Banned,
}

impl AccountStatus {
    /// Returns the stable storage name of this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Banned => "banned",
        }
    }

    /// Returns true if the account may be mutated.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AccountStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "suspended" => Ok(Self::Suspended),
            "banned" => Ok(Self::Banned),
            _ => Err(format!("Unknown account status: {s}")),
        }
    }
}

/// One wallet per user.
///
/// `balance` is never negative and always equals the sum of the user's
/// ledger entry amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Wallet owner.
    pub user_id: UserId,
    /// Coins available.
    pub balance: i64,
    /// Content permanently unlocked by this user.
    pub entitlements: BTreeSet<ContentId>,
    /// Instant of the last successful check-in.
    pub last_check_in_at: Option<DateTime<Utc>>,
    /// Consecutive check-in days, `0` before the first claim.
    pub streak_count: u32,
    /// Mutation gate.
    pub status: AccountStatus,
    /// When the wallet was opened.
    pub created_at: DateTime<Utc>,
    /// Last mutation.
    pub updated_at: DateTime<Utc>,
}

impl AccountRecord {
    /// Creates an empty active wallet.
    #[must_use]
    pub fn open(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            balance: 0,
            entitlements: BTreeSet::new(),
            last_check_in_at: None,
            streak_count: 0,
            status: AccountStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if the user holds the entitlement.
    #[must_use]
    pub fn is_entitled(&self, content_id: &ContentId) -> bool {
        self.entitlements.contains(content_id)
    }

    /// Returns true if the balance covers `amount`.
    #[must_use]
    pub const fn can_afford(&self, amount: i64) -> bool {
        self.balance >= amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[test]
    fn test_open_account_is_empty_and_active() {
        let user_id = UserId::new();
        let now = Utc::now();
        let account = AccountRecord::open(user_id, now);

        assert_eq!(account.user_id, user_id);
        assert_eq!(account.balance, 0);
        assert!(account.entitlements.is_empty());
        assert!(account.last_check_in_at.is_none());
        assert_eq!(account.streak_count, 0);
        assert!(account.status.is_active());
        assert_eq!(account.created_at, now);
    }

    #[rstest]
    #[case("active", AccountStatus::Active)]
    #[case("SUSPENDED", AccountStatus::Suspended)]
    #[case("Banned", AccountStatus::Banned)]
    fn test_status_from_str(#[case] input: &str, #[case] expected: AccountStatus) {
        assert_eq!(AccountStatus::from_str(input).unwrap(), expected);
    }

    #[test]
    fn test_status_rejects_unknown() {
        assert!(AccountStatus::from_str("frozen").is_err());
    }

    #[test]
    fn test_only_active_is_active() {
        assert!(AccountStatus::Active.is_active());
        assert!(!AccountStatus::Suspended.is_active());
        assert!(!AccountStatus::Banned.is_active());
    }

    #[test]
    fn test_entitlement_and_affordability() {
        let mut account = AccountRecord::open(UserId::new(), Utc::now());
        account.balance = 150;
        let content = ContentId::new("c1");
        assert!(!account.is_entitled(&content));
        account.entitlements.insert(content.clone());
        assert!(account.is_entitled(&content));
        assert!(account.can_afford(150));
        assert!(!account.can_afford(151));
    }
}
