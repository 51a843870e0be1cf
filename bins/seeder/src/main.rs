//! Database seeder for Inkwell development and testing.
//!
//! Seeds the content catalog, a demo reader wallet with welcome coins, and
//! prints bearer tokens for the demo reader and operator.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use inkwell_core::{Actor, BalanceEngine, ContentItem};
use inkwell_db::{ContentRepository, PgLedgerStore};
use inkwell_shared::types::UserId;
use inkwell_shared::{AppConfig, CallerRole, JwtService};
use uuid::Uuid;

/// Demo operator ID (consistent for all seeds)
const DEMO_ADMIN_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Demo reader ID (consistent for all seeds)
const DEMO_READER_ID: &str = "00000000-0000-0000-0000-000000000002";
/// Coins granted to the demo reader on first seed.
const WELCOME_COINS: i64 = 500;

/// Catalog of `(content id, unlock cost)`.
const CATALOG: [(&str, i64); 6] = [
    ("prologue", 0),
    ("chapter-1", 50),
    ("chapter-2", 50),
    ("chapter-3", 80),
    ("chapter-4", 80),
    ("bonus-artbook", 300),
];

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().expect("Failed to load configuration");

    println!("Connecting to database...");
    let db = inkwell_db::connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding content catalog...");
    seed_catalog(&ContentRepository::new(db.clone())).await;

    let engine = BalanceEngine::from_config(Arc::new(PgLedgerStore::new(db)), &config.ledger)
        .expect("Invalid ledger configuration");

    println!("Seeding demo wallet...");
    seed_demo_wallet(&engine).await;

    println!("Issuing development tokens...");
    print_tokens(&JwtService::new(&config.jwt));

    println!("Seeding complete!");
}

fn demo_admin_id() -> Uuid {
    Uuid::parse_str(DEMO_ADMIN_ID).unwrap_or_default()
}

fn demo_reader_id() -> Uuid {
    Uuid::parse_str(DEMO_READER_ID).unwrap_or_default()
}

/// Upserts every catalog item.
async fn seed_catalog(repo: &ContentRepository) {
    for (id, cost) in CATALOG {
        if let Err(e) = repo.upsert(&ContentItem::new(id, cost)).await {
            eprintln!("Failed to upsert content {id}: {e}");
        }
    }

    match repo.list().await {
        Ok(items) => {
            for item in items {
                let unlocks = repo.unlock_count(&item.id).await.ok().flatten().unwrap_or(0);
                println!(
                    "  {}: {} coins ({} unlocks)",
                    item.id, item.unlock_cost, unlocks
                );
            }
        }
        Err(e) => eprintln!("Failed to list catalog: {e}"),
    }
}

/// Opens the demo reader's wallet and tops up an empty one.
async fn seed_demo_wallet(engine: &BalanceEngine) {
    let reader = UserId::from_uuid(demo_reader_id());
    let account = match engine.open_account(reader).await {
        Ok(account) => account,
        Err(e) => {
            eprintln!("Failed to open demo wallet: {e}");
            return;
        }
    };

    if account.balance > 0 {
        println!("  Demo wallet already funded ({} coins), skipping...", account.balance);
        return;
    }

    let operator = Actor::admin(UserId::from_uuid(demo_admin_id()));
    match engine
        .admin_adjust_balance(operator, reader, WELCOME_COINS, "Seeder welcome coins")
        .await
    {
        Ok(outcome) => println!("  Demo wallet funded: {} coins", outcome.new_balance),
        Err(e) => eprintln!("Failed to fund demo wallet: {e}"),
    }
}

/// Prints bearer tokens for local testing.
fn print_tokens(jwt: &JwtService) {
    for (label, id, role) in [
        ("reader", demo_reader_id(), CallerRole::User),
        ("admin", demo_admin_id(), CallerRole::Admin),
    ] {
        match jwt.generate_access_token(id, role) {
            Ok(token) => println!("  {label} ({id}): {token}"),
            Err(e) => eprintln!("Failed to issue {label} token: {e}"),
        }
    }
}
