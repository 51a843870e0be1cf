//! Wallet schema.
//!
//! Creates the catalog, account, ledger, unlock and idempotency tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: CATALOG
        // ============================================================
        db.execute_unprepared(CONTENTS_SQL).await?;

        // ============================================================
        // PART 2: WALLETS
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 3: LEDGER & IDEMPOTENCY
        // ============================================================
        db.execute_unprepared(LEDGER_ENTRIES_SQL).await?;
        db.execute_unprepared(IDEMPOTENCY_LOCKS_SQL).await?;

        // ============================================================
        // PART 4: UNLOCK TALLY
        // ============================================================
        db.execute_unprepared(CONTENT_UNLOCKS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const CONTENTS_SQL: &str = r"
CREATE TABLE contents (
    id VARCHAR(255) PRIMARY KEY,
    unlock_cost BIGINT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_contents_cost CHECK (unlock_cost >= 0)
);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    user_id UUID PRIMARY KEY,
    balance BIGINT NOT NULL DEFAULT 0,
    entitlements JSONB NOT NULL DEFAULT '[]'::jsonb,
    last_check_in_at TIMESTAMPTZ,
    streak_count INTEGER NOT NULL DEFAULT 0,
    status VARCHAR(16) NOT NULL DEFAULT 'active',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_accounts_balance CHECK (balance >= 0),
    CONSTRAINT chk_accounts_streak CHECK (streak_count >= 0),
    CONSTRAINT chk_accounts_status CHECK (status IN ('active', 'suspended', 'banned')),
    CONSTRAINT chk_accounts_entitlements CHECK (jsonb_typeof(entitlements) = 'array')
);
";

const LEDGER_ENTRIES_SQL: &str = r"
CREATE TABLE ledger_entries (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL REFERENCES accounts(user_id),
    amount BIGINT NOT NULL,
    kind VARCHAR(32) NOT NULL,
    related_entity_id VARCHAR(255),
    description TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_ledger_kind CHECK (
        kind IN ('purchase_currency', 'unlock_content', 'download_content', 'admin_adjustment')
    )
);

-- History listing (newest first per user)
CREATE INDEX idx_ledger_entries_user ON ledger_entries(user_id, created_at DESC, id DESC);
";

const IDEMPOTENCY_LOCKS_SQL: &str = r"
CREATE TABLE idempotency_locks (
    event_id VARCHAR(255) PRIMARY KEY,
    user_id UUID NOT NULL REFERENCES accounts(user_id),
    credited_amount BIGINT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_locks_amount CHECK (credited_amount > 0)
);
";

// One row per unlock entry; the tally is a count over these rows.
const CONTENT_UNLOCKS_SQL: &str = r"
CREATE TABLE content_unlocks (
    entry_id UUID PRIMARY KEY REFERENCES ledger_entries(id),
    content_id VARCHAR(255) NOT NULL REFERENCES contents(id),
    user_id UUID NOT NULL REFERENCES accounts(user_id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_content_unlocks_content ON content_unlocks(content_id);
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS content_unlocks CASCADE;
DROP TABLE IF EXISTS idempotency_locks CASCADE;
DROP TABLE IF EXISTS ledger_entries CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
DROP TABLE IF EXISTS contents CASCADE;
";
