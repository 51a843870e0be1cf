//! Wallet routes for the authenticated reader.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use tracing::info;

use crate::{AppState, error::ApiError, middleware::AuthUser};
use inkwell_core::{
    AccountRecord, CheckInOutcome, CheckInStatus, CreditOutcome, DownloadOutcome, LedgerEntry,
    UnlockOutcome,
};
use inkwell_shared::types::{ContentId, ExternalEventId, PageRequest, PageResponse};

/// Creates the wallet routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/wallet", post(open_wallet).get(get_wallet))
        .route("/wallet/history", get(get_history))
        .route("/wallet/unlocks", post(unlock_content))
        .route("/wallet/downloads", post(record_download))
        .route("/wallet/check-in", get(get_check_in).post(check_in))
        .route("/wallet/purchases", post(purchase))
}

/// Request body naming a content item.
#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    /// Content item id.
    pub content_id: ContentId,
}

/// Request body for a purchase.
#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    /// Gateway order id approved by the buyer.
    pub order_id: ExternalEventId,
}

/// Opens the caller's wallet. Idempotent.
async fn open_wallet(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<(StatusCode, Json<AccountRecord>), ApiError> {
    let account = state.engine.open_account(auth.user_id()).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

async fn get_wallet(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<AccountRecord>, ApiError> {
    Ok(Json(state.engine.account_summary(auth.user_id()).await?))
}

/// Lists the caller's ledger, newest first.
async fn get_history(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
) -> Result<Json<PageResponse<LedgerEntry>>, ApiError> {
    Ok(Json(state.engine.history(auth.user_id(), page).await?))
}

async fn unlock_content(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<ContentRequest>,
) -> Result<Json<UnlockOutcome>, ApiError> {
    let outcome = state
        .engine
        .unlock_content(auth.user_id(), &body.content_id)
        .await?;
    Ok(Json(outcome))
}

async fn record_download(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<ContentRequest>,
) -> Result<Json<DownloadOutcome>, ApiError> {
    let outcome = state
        .engine
        .record_download(auth.user_id(), &body.content_id)
        .await?;
    Ok(Json(outcome))
}

async fn get_check_in(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<CheckInStatus>, ApiError> {
    Ok(Json(state.engine.check_in_status(auth.user_id()).await?))
}

/// Claims today's reward. A repeat claim answers 200 with `already_claimed`.
async fn check_in(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<CheckInOutcome>, ApiError> {
    Ok(Json(state.engine.daily_check_in(auth.user_id()).await?))
}

/// Captures a gateway order and credits the coins it paid for.
async fn purchase(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<PurchaseRequest>,
) -> Result<Json<CreditOutcome>, ApiError> {
    let user_id = auth.user_id();
    let outcome = state
        .engine
        .purchase(
            state.gateway.as_ref(),
            state.prices.as_ref(),
            user_id,
            &body.order_id,
        )
        .await?;

    info!(
        user_id = %user_id,
        order_id = %body.order_id,
        credited = outcome.credited,
        duplicate = outcome.duplicate,
        "Purchase processed"
    );
    Ok(Json(outcome))
}
