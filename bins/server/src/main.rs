//! Inkwell API Server
//!
//! Main entry point for the wallet and ledger service.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sea_orm::{ConnectOptions, Database};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inkwell_api::{AppState, HttpPaymentGateway, create_router};
use inkwell_core::{BalanceEngine, PriceTable};
use inkwell_db::PgLedgerStore;
use inkwell_shared::{AppConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inkwell=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Connect to database
    let mut options = ConnectOptions::new(config.database.url.clone());
    options
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .context("Failed to connect to database")?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    // Balance engine over the serializable PostgreSQL store
    let engine = BalanceEngine::from_config(Arc::new(PgLedgerStore::new(db)), &config.ledger)
        .context("Invalid ledger configuration")?;
    info!(
        business_timezone = %config.ledger.business_timezone,
        max_attempts = config.ledger.max_attempts,
        "Balance engine configured"
    );

    // Payments
    let prices = PriceTable::from_config(&config.payments).context("Invalid price table")?;
    let gateway = HttpPaymentGateway::new(&config.payments).context("Invalid gateway config")?;
    info!(
        gateway_url = %config.payments.gateway_url,
        currency = %prices.currency(),
        "Payment gateway configured"
    );

    let state = AppState {
        engine: Arc::new(engine),
        jwt_service: Arc::new(JwtService::new(&config.jwt)),
        gateway: Arc::new(gateway),
        prices: Arc::new(prices),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
