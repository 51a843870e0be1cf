//! Read-only view of the content catalog.

use inkwell_shared::types::ContentId;
use serde::{Deserialize, Serialize};

use crate::ledger::LedgerError;

/// A priced content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Catalog id.
    pub id: ContentId,
    /// Coins needed to unlock, `0` for free content.
    pub unlock_cost: i64,
}

impl ContentItem {
    /// Creates a catalog item.
    #[must_use]
    pub fn new(id: impl Into<ContentId>, unlock_cost: i64) -> Self {
        Self {
            id: id.into(),
            unlock_cost,
        }
    }

    /// Returns the cost, rejecting corrupt negative prices.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the catalog stores a negative cost.
    pub fn checked_cost(&self) -> Result<i64, LedgerError> {
        if self.unlock_cost < 0 {
            return Err(LedgerError::InvalidInput(format!(
                "Content {} has a negative unlock cost",
                self.id
            )));
        }
        Ok(self.unlock_cost)
    }

    /// Returns true for content that costs nothing.
    #[must_use]
    pub const fn is_free(&self) -> bool {
        self.unlock_cost == 0
    }
}
