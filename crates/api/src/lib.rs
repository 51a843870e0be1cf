//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for wallets and wallet administration
//! - Authentication middleware
//! - The error response mapping
//! - The HTTP payment gateway client

pub mod error;
pub mod gateway;
pub mod middleware;
pub mod routes;

use axum::Router;
use inkwell_core::{BalanceEngine, PaymentGateway, PriceTable};
use inkwell_shared::JwtService;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use gateway::HttpPaymentGateway;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Balance engine.
    pub engine: Arc<BalanceEngine>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Payment gateway used for purchases.
    pub gateway: Arc<dyn PaymentGateway>,
    /// Price to coin table for purchases.
    pub prices: Arc<PriceTable>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
