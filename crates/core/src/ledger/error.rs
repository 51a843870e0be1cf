//! Ledger error types.
//!
//! Every business rule failure of the balance engine is one of these
//! variants. Idempotent outcomes (already unlocked, duplicate payment,
//! already claimed) are successes and never appear here.

use inkwell_shared::types::{ContentId, UserId};
use thiserror::Error;

use crate::account::AccountStatus;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Business Rule Errors ==========
    /// The wallet cannot cover the debit.
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        /// Coins the operation needs.
        required: i64,
        /// Coins in the wallet when the transaction read it.
        available: i64,
    },

    // ========== Not Found Errors ==========
    /// No wallet exists for the user.
    #[error("Account not found: {0}")]
    AccountNotFound(UserId),

    /// The catalog has no such content item.
    #[error("Content not found: {0}")]
    ContentNotFound(ContentId),

    /// The user holds no entitlement for the content item.
    #[error("User {user_id} has no entitlement for {content_id}")]
    EntitlementNotFound {
        /// Wallet owner.
        user_id: UserId,
        /// Content item.
        content_id: ContentId,
    },

    // ========== Permission Errors ==========
    /// The wallet is suspended or banned.
    #[error("Account {user_id} is {status}")]
    AccountInactive {
        /// Wallet owner.
        user_id: UserId,
        /// Current status.
        status: AccountStatus,
    },

    /// The caller is not an administrator.
    #[error("User {0} is not allowed to perform administrative changes")]
    AdminRequired(UserId),

    // ========== Validation Errors ==========
    /// Malformed amount, reason, id or catalog data.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ========== Concurrency Errors ==========
    /// Store contention outlasted every retry.
    #[error("Transaction contention persisted after {attempts} attempts, please retry")]
    TransientConflict {
        /// Attempts made before giving up.
        attempts: u32,
    },

    // ========== Infrastructure Errors ==========
    /// The store failed for a reason other than contention.
    #[error("Store error: {0}")]
    Store(String),

    /// The payment gateway failed or answered nonsense.
    #[error("External service error: {0}")]
    External(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::ContentNotFound(_) => "CONTENT_NOT_FOUND",
            Self::EntitlementNotFound { .. } => "ENTITLEMENT_NOT_FOUND",
            Self::AccountInactive { .. } => "ACCOUNT_INACTIVE",
            Self::AdminRequired(_) => "ADMIN_REQUIRED",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::TransientConflict { .. } => "TRANSIENT_CONFLICT",
            Self::Store(_) => "STORE_ERROR",
            Self::External(_) => "EXTERNAL_SERVICE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            Self::InsufficientFunds { .. } => 402,
            Self::AccountInactive { .. } | Self::AdminRequired(_) => 403,
            Self::AccountNotFound(_)
            | Self::ContentNotFound(_)
            | Self::EntitlementNotFound { .. } => 404,
            Self::TransientConflict { .. } => 409,
            Self::Store(_) => 500,
            Self::External(_) => 502,
        }
    }

    /// Returns true if the caller may repeat the exact same call.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientConflict { .. })
    }
}
