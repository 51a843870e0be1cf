//! Payment capture verification.
//!
//! The gateway reports what a buyer actually paid for an order. Coins are
//! credited only for completed captures whose amount is one of the
//! configured price points; the order id becomes the idempotency key.

use std::collections::BTreeMap;

use async_trait::async_trait;
use inkwell_shared::config::PaymentsConfig;
use inkwell_shared::types::ExternalEventId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ledger::LedgerError;

/// Longest order id forwarded to a gateway.
pub const MAX_ORDER_ID_CHARS: usize = 64;

/// Returns whether an order id is a plain token: 1 to
/// [`MAX_ORDER_ID_CHARS`] ASCII letters, digits, `-` or `_`.
///
/// Gateways address orders by id in a URL path, so anything else is
/// refused before a capture is attempted.
#[must_use]
pub fn is_plain_order_id(order_id: &ExternalEventId) -> bool {
    let id = order_id.as_str();
    !id.is_empty()
        && id.len() <= MAX_ORDER_ID_CHARS
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Capture state reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaptureStatus {
    /// Funds captured.
    Completed,
    /// Capture still in flight.
    Pending,
    /// Buyer or processor declined.
    Declined,
    /// Anything else the gateway reports.
    #[serde(other)]
    Other,
}

/// Result of capturing an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureResult {
    /// Gateway order id.
    pub order_id: ExternalEventId,
    /// Capture state.
    pub status: CaptureStatus,
    /// Amount paid.
    pub amount: Decimal,
    /// ISO 4217 code of `amount`.
    pub currency: String,
}

/// Errors raised by a payment gateway client.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The gateway could not be reached.
    #[error("Payment gateway unreachable: {0}")]
    Transport(String),

    /// The gateway rejected the request.
    #[error("Payment gateway rejected the request ({status}): {message}")]
    Rejected {
        /// HTTP status returned.
        status: u16,
        /// Gateway message.
        message: String,
    },

    /// The gateway answered something unreadable.
    #[error("Malformed payment gateway response: {0}")]
    Malformed(String),
}

impl From<GatewayError> for LedgerError {
    fn from(err: GatewayError) -> Self {
        Self::External(err.to_string())
    }
}

/// Captures orders at the payment provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Captures an order, or reports the existing capture of an order
    /// captured before.
    async fn capture(&self, order_id: &ExternalEventId) -> Result<CaptureResult, GatewayError>;
}

/// Fixed price to coin table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceTable {
    currency: String,
    points: BTreeMap<Decimal, i64>,
}

impl PriceTable {
    /// Creates a table from `(price, coins)` pairs.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for non-positive prices or coin amounts, or
    /// a price listed twice.
    pub fn new(
        currency: impl Into<String>,
        points: impl IntoIterator<Item = (Decimal, i64)>,
    ) -> Result<Self, LedgerError> {
        let mut table = BTreeMap::new();
        for (price, coins) in points {
            if price <= Decimal::ZERO || coins <= 0 {
                return Err(LedgerError::InvalidInput(format!(
                    "Invalid price point {price} -> {coins}"
                )));
            }
            if table.insert(price.normalize(), coins).is_some() {
                return Err(LedgerError::InvalidInput(format!(
                    "Duplicate price point {price}"
                )));
            }
        }
        Ok(Self {
            currency: currency.into().to_uppercase(),
            points: table,
        })
    }

    /// Creates the table configured for purchases.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the configured price points are invalid.
    pub fn from_config(config: &PaymentsConfig) -> Result<Self, LedgerError> {
        Self::new(
            config.currency.as_str(),
            config.price_points.iter().map(|p| (p.price, p.credits)),
        )
    }

    /// Returns the table currency.
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Returns the coins sold for a price.
    #[must_use]
    pub fn credits_for(&self, price: Decimal) -> Option<i64> {
        self.points.get(&price.normalize()).copied()
    }

    /// Checks a capture and returns the coins to credit.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for captures that are not completed, are in
    /// another currency, or paid an amount that is not a price point.
    pub fn verify(&self, capture: &CaptureResult) -> Result<i64, LedgerError> {
        if capture.status != CaptureStatus::Completed {
            return Err(LedgerError::InvalidInput(format!(
                "Order {} is not completed ({:?})",
                capture.order_id, capture.status
            )));
        }
        if !capture.currency.eq_ignore_ascii_case(&self.currency) {
            return Err(LedgerError::InvalidInput(format!(
                "Order {} was paid in {}, expected {}",
                capture.order_id, capture.currency, self.currency
            )));
        }
        self.credits_for(capture.amount).ok_or_else(|| {
            LedgerError::InvalidInput(format!(
                "Order {} paid {} which is not a known price point",
                capture.order_id, capture.amount
            ))
        })
    }
}
