//! HTTP client for the payment gateway.
//!
//! Captures are requested with `POST {base}/orders/{id}/capture`. A gateway
//! answers `422` for an order that was captured before; the existing
//! capture is then read with `GET {base}/orders/{id}`. The order id is
//! always percent-encoded as one path segment.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info};

use inkwell_core::{CaptureResult, CaptureStatus, GatewayError, PaymentGateway};
use inkwell_shared::config::PaymentsConfig;
use inkwell_shared::types::ExternalEventId;

/// Order as reported by the gateway.
#[derive(Debug, Deserialize)]
struct OrderBody {
    id: String,
    status: CaptureStatus,
    amount: AmountBody,
}

#[derive(Debug, Deserialize)]
struct AmountBody {
    currency_code: String,
    value: Decimal,
}

impl From<OrderBody> for CaptureResult {
    fn from(body: OrderBody) -> Self {
        Self {
            order_id: body.id.into(),
            status: body.status,
            amount: body.amount.value,
            currency: body.amount.currency_code,
        }
    }
}

/// Payment gateway reached over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpPaymentGateway {
    base_url: Url,
    api_key: String,
    http_client: reqwest::Client,
}

impl HttpPaymentGateway {
    /// Creates a client from the payments configuration.
    ///
    /// # Errors
    ///
    /// Returns `Transport` if the gateway URL is not an absolute base URL
    /// or the HTTP client cannot be built.
    pub fn new(config: &PaymentsConfig) -> Result<Self, GatewayError> {
        let base_url = Url::parse(&config.gateway_url).map_err(|e| {
            GatewayError::Transport(format!("Invalid gateway URL {}: {e}", config.gateway_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::Transport(format!(
                "Gateway URL {base_url} cannot be a base URL"
            )));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("inkwell/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self {
            base_url,
            api_key: config.api_key.clone(),
            http_client,
        })
    }

    /// Builds `{base}/orders/{id}` followed by `tail`, one segment each.
    fn order_url(&self, order_id: &ExternalEventId, tail: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                GatewayError::Transport(format!(
                    "Gateway URL {} cannot be a base URL",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .push("orders")
            .push(order_id.as_str())
            .extend(tail);
        Ok(url)
    }

    async fn read_order(response: reqwest::Response) -> Result<CaptureResult, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<OrderBody>()
            .await
            .map(CaptureResult::from)
            .map_err(|e| GatewayError::Malformed(e.to_string()))
    }

    async fn fetch_order(&self, order_id: &ExternalEventId) -> Result<CaptureResult, GatewayError> {
        let response = self
            .http_client
            .get(self.order_url(order_id, &[])?)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Self::read_order(response).await
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn capture(&self, order_id: &ExternalEventId) -> Result<CaptureResult, GatewayError> {
        let response = self
            .http_client
            .post(self.order_url(order_id, &["capture"])?)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if response.status() == StatusCode::UNPROCESSABLE_ENTITY {
            debug!(order_id = %order_id, "Order already captured, reading existing capture");
            return self.fetch_order(order_id).await;
        }

        let capture = Self::read_order(response).await?;
        info!(
            order_id = %order_id,
            status = ?capture.status,
            amount = %capture.amount,
            "Payment captured"
        );
        Ok(capture)
    }
}
