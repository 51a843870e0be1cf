//! Append-only ledger and idempotency locks.
//!
//! Rows of `ledger_entries`, `idempotency_locks` and `content_unlocks` are
//! written once and never changed; the database rejects any attempt.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(IMMUTABILITY_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const IMMUTABILITY_SQL: &str = r"
-- ============================================================
-- FUNCTION: reject_mutation
-- Raises on UPDATE and DELETE of append-only rows
-- ============================================================
CREATE OR REPLACE FUNCTION reject_mutation()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION '% rows are append-only (% rejected)', TG_TABLE_NAME, TG_OP;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_ledger_entries_append_only
BEFORE UPDATE OR DELETE ON ledger_entries
FOR EACH ROW
EXECUTE FUNCTION reject_mutation();

CREATE TRIGGER trg_idempotency_locks_append_only
BEFORE UPDATE OR DELETE ON idempotency_locks
FOR EACH ROW
EXECUTE FUNCTION reject_mutation();

CREATE TRIGGER trg_content_unlocks_append_only
BEFORE UPDATE OR DELETE ON content_unlocks
FOR EACH ROW
EXECUTE FUNCTION reject_mutation();
";

const DROP_SQL: &str = r"
DROP TRIGGER IF EXISTS trg_content_unlocks_append_only ON content_unlocks;
DROP TRIGGER IF EXISTS trg_idempotency_locks_append_only ON idempotency_locks;
DROP TRIGGER IF EXISTS trg_ledger_entries_append_only ON ledger_entries;
DROP FUNCTION IF EXISTS reject_mutation();
";
