//! Wallet administration routes.
//!
//! The engine checks the caller's role for every mutation; reconciliation
//! is a read and is gated here.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use serde::Deserialize;

use crate::{AppState, error::ApiError, middleware::AuthUser};
use inkwell_core::{AccountRecord, AccountStatus, AdjustmentOutcome, Reconciliation, RevocationOutcome};
use inkwell_shared::types::{ContentId, UserId};

/// Creates the admin routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/accounts/{user_id}/adjustments", post(adjust_balance))
        .route("/admin/accounts/{user_id}/revocations", post(revoke_entitlement))
        .route("/admin/accounts/{user_id}/status", put(set_status))
        .route("/admin/accounts/{user_id}/reconciliation", get(reconcile))
}

/// Request body for a balance adjustment.
#[derive(Debug, Deserialize)]
pub struct AdjustmentRequest {
    /// Signed coin delta.
    pub delta: i64,
    /// Reason recorded on the ledger entry.
    pub reason: String,
}

/// Request body for revoking an entitlement.
#[derive(Debug, Deserialize)]
pub struct RevocationRequest {
    /// Content item to revoke.
    pub content_id: ContentId,
    /// Reason recorded on the ledger entry.
    pub reason: String,
}

/// Request body for changing an account status.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    /// New status.
    pub status: AccountStatus,
}

async fn adjust_balance(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<UserId>,
    Json(body): Json<AdjustmentRequest>,
) -> Result<Json<AdjustmentOutcome>, ApiError> {
    let outcome = state
        .engine
        .admin_adjust_balance(auth.actor(), user_id, body.delta, &body.reason)
        .await?;
    Ok(Json(outcome))
}

async fn revoke_entitlement(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<UserId>,
    Json(body): Json<RevocationRequest>,
) -> Result<Json<RevocationOutcome>, ApiError> {
    let outcome = state
        .engine
        .revoke_entitlement(auth.actor(), user_id, &body.content_id, &body.reason)
        .await?;
    Ok(Json(outcome))
}

async fn set_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<UserId>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<AccountRecord>, ApiError> {
    let account = state
        .engine
        .set_account_status(auth.actor(), user_id, body.status)
        .await?;
    Ok(Json(account))
}

async fn reconcile(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<UserId>,
) -> Result<Json<Reconciliation>, ApiError> {
    auth.actor().require_admin()?;
    Ok(Json(state.engine.reconcile(user_id).await?))
}
