//! PostgreSQL implementation of the ledger store.
//!
//! Every transaction runs at `SERIALIZABLE` isolation. Serialization
//! failures, deadlocks and unique violations surface as
//! [`StoreError::Conflict`] so the engine re-runs the whole operation.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    AccessMode, ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, IsolationLevel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RuntimeErr,
    Set, TransactionTrait,
};
use tracing::{debug, warn};

use inkwell_core::store::{LedgerStore, LedgerTransaction, StoreError};
use inkwell_core::{AccountRecord, ContentItem, IdempotencyLock, LedgerEntry};
use inkwell_shared::types::{ContentId, ExternalEventId, LedgerEntryId, PageRequest, UserId};

use crate::entities::{accounts, content_unlocks, contents, idempotency_locks, ledger_entries};

/// SQLSTATE codes that mean "run the transaction again".
const RETRYABLE_SQLSTATES: [&str; 3] = [
    "40001", // serialization_failure
    "40P01", // deadlock_detected
    "23505", // unique_violation
];

/// Ledger store backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgLedgerStore {
    db: DatabaseConnection,
}

impl PgLedgerStore {
    /// Creates a new store.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>, StoreError> {
        let txn = self
            .db
            .begin_with_config(
                Some(IsolationLevel::Serializable),
                Some(AccessMode::ReadWrite),
            )
            .await
            .map_err(map_db_err)?;
        Ok(Box::new(PgLedgerTransaction { txn }))
    }

    async fn list_entries(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<(Vec<LedgerEntry>, u64), StoreError> {
        let query = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::UserId.eq(user_id.into_inner()));

        let total = query.clone().count(&self.db).await.map_err(map_db_err)?;
        let models = query
            .order_by_desc(ledger_entries::Column::CreatedAt)
            .order_by_desc(ledger_entries::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        let entries = models
            .into_iter()
            .map(entry_from_model)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((entries, total))
    }
}

struct PgLedgerTransaction {
    txn: DatabaseTransaction,
}

#[async_trait]
impl LedgerTransaction for PgLedgerTransaction {
    async fn load_account(&mut self, user_id: UserId) -> Result<Option<AccountRecord>, StoreError> {
        accounts::Entity::find_by_id(user_id.into_inner())
            .one(&self.txn)
            .await
            .map_err(map_db_err)?
            .map(account_from_model)
            .transpose()
    }

    async fn load_content(
        &mut self,
        content_id: &ContentId,
    ) -> Result<Option<ContentItem>, StoreError> {
        let model = contents::Entity::find_by_id(content_id.as_str().to_string())
            .one(&self.txn)
            .await
            .map_err(map_db_err)?;
        Ok(model.map(|m| ContentItem::new(m.id, m.unlock_cost)))
    }

    async fn find_idempotency_lock(
        &mut self,
        event_id: &ExternalEventId,
    ) -> Result<Option<IdempotencyLock>, StoreError> {
        let model = idempotency_locks::Entity::find_by_id(event_id.as_str().to_string())
            .one(&self.txn)
            .await
            .map_err(map_db_err)?;
        Ok(model.map(|m| {
            IdempotencyLock::new(
                m.event_id.into(),
                UserId::from_uuid(m.user_id),
                m.credited_amount,
                m.created_at.with_timezone(&Utc),
            )
        }))
    }

    async fn sum_entries(&mut self, user_id: UserId) -> Result<i64, StoreError> {
        let total = ledger_entries::Entity::find()
            .select_only()
            .column_as(Expr::cust("COALESCE(SUM(amount), 0)::BIGINT"), "total")
            .filter(ledger_entries::Column::UserId.eq(user_id.into_inner()))
            .into_tuple::<i64>()
            .one(&self.txn)
            .await
            .map_err(map_db_err)?;
        Ok(total.unwrap_or(0))
    }

    async fn insert_account(&mut self, account: &AccountRecord) -> Result<(), StoreError> {
        account_to_active(account)?
            .insert(&self.txn)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    async fn save_account(&mut self, account: &AccountRecord) -> Result<(), StoreError> {
        account_to_active(account)?
            .update(&self.txn)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    async fn append_entry(&mut self, entry: &LedgerEntry) -> Result<(), StoreError> {
        ledger_entries::ActiveModel {
            id: Set(entry.id.into_inner()),
            user_id: Set(entry.user_id.into_inner()),
            amount: Set(entry.amount),
            kind: Set(entry.kind.as_str().to_string()),
            related_entity_id: Set(entry.related_entity_id.clone()),
            description: Set(entry.description.clone()),
            created_at: Set(entry.created_at.fixed_offset()),
        }
        .insert(&self.txn)
        .await
        .map_err(map_db_err)?;
        Ok(())
    }

    async fn record_unlock(
        &mut self,
        content_id: &ContentId,
        entry: &LedgerEntry,
    ) -> Result<(), StoreError> {
        content_unlocks::ActiveModel {
            entry_id: Set(entry.id.into_inner()),
            content_id: Set(content_id.as_str().to_string()),
            user_id: Set(entry.user_id.into_inner()),
            created_at: Set(entry.created_at.fixed_offset()),
        }
        .insert(&self.txn)
        .await
        .map_err(map_db_err)?;
        Ok(())
    }

    async fn insert_idempotency_lock(&mut self, lock: &IdempotencyLock) -> Result<(), StoreError> {
        idempotency_locks::ActiveModel {
            event_id: Set(lock.event_id.as_str().to_string()),
            user_id: Set(lock.user_id.into_inner()),
            credited_amount: Set(lock.credited_amount),
            created_at: Set(lock.created_at.fixed_offset()),
        }
        .insert(&self.txn)
        .await
        .map_err(map_db_err)?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.txn.commit().await.map_err(map_db_err)
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.txn.rollback().await.map_err(map_db_err)
    }
}

/// Classifies a database error as retryable contention or a hard failure.
pub(crate) fn map_db_err(err: DbErr) -> StoreError {
    match sqlstate(&err) {
        Some(code) if RETRYABLE_SQLSTATES.contains(&code.as_str()) => {
            debug!(sqlstate = %code, error = %err, "Retryable database conflict");
            StoreError::Conflict(format!("SQLSTATE {code}: {err}"))
        }
        _ => {
            warn!(error = %err, "Database error");
            StoreError::Backend(err.to_string())
        }
    }
}

fn sqlstate(err: &DbErr) -> Option<String> {
    match err {
        DbErr::Exec(RuntimeErr::SqlxError(e))
        | DbErr::Query(RuntimeErr::SqlxError(e))
        | DbErr::Conn(RuntimeErr::SqlxError(e)) => e
            .as_database_error()
            .and_then(|db_err| db_err.code())
            .map(|code| code.into_owned()),
        _ => None,
    }
}

fn corrupt(what: &str, detail: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(format!("Corrupt {what}: {detail}"))
}

fn account_from_model(model: accounts::Model) -> Result<AccountRecord, StoreError> {
    let entitlements: BTreeSet<ContentId> =
        serde_json::from_value(model.entitlements).map_err(|e| corrupt("entitlements", e))?;
    Ok(AccountRecord {
        user_id: UserId::from_uuid(model.user_id),
        balance: model.balance,
        entitlements,
        last_check_in_at: model.last_check_in_at.map(|at| at.with_timezone(&Utc)),
        streak_count: u32::try_from(model.streak_count).map_err(|e| corrupt("streak", e))?,
        status: model.status.parse().map_err(|e| corrupt("status", e))?,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

fn account_to_active(account: &AccountRecord) -> Result<accounts::ActiveModel, StoreError> {
    let entitlements =
        serde_json::to_value(&account.entitlements).map_err(|e| corrupt("entitlements", e))?;
    let streak_count = i32::try_from(account.streak_count).map_err(|e| corrupt("streak", e))?;
    Ok(accounts::ActiveModel {
        user_id: Set(account.user_id.into_inner()),
        balance: Set(account.balance),
        entitlements: Set(entitlements),
        last_check_in_at: Set(account.last_check_in_at.map(|at| at.fixed_offset())),
        streak_count: Set(streak_count),
        status: Set(account.status.as_str().to_string()),
        created_at: Set(account.created_at.fixed_offset()),
        updated_at: Set(account.updated_at.fixed_offset()),
    })
}

fn entry_from_model(model: ledger_entries::Model) -> Result<LedgerEntry, StoreError> {
    Ok(LedgerEntry {
        id: LedgerEntryId::from_uuid(model.id),
        user_id: UserId::from_uuid(model.user_id),
        amount: model.amount,
        kind: model.kind.parse().map_err(|e| corrupt("entry kind", e))?,
        related_entity_id: model.related_entity_id,
        description: model.description,
        created_at: to_utc(model.created_at),
    })
}

fn to_utc(at: DateTime<chrono::FixedOffset>) -> DateTime<Utc> {
    at.with_timezone(&Utc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkwell_core::AccountStatus;

    #[test]
    fn test_account_model_roundtrip() {
        let mut account = AccountRecord::open(UserId::new(), Utc::now());
        account.balance = 75;
        account.streak_count = 3;
        account.status = AccountStatus::Suspended;
        account.entitlements.insert(ContentId::new("chapter-1"));
        account.entitlements.insert(ContentId::new("chapter-2"));

        let active = account_to_active(&account).unwrap();
        let model = accounts::Model {
            user_id: active.user_id.unwrap(),
            balance: active.balance.unwrap(),
            entitlements: active.entitlements.unwrap(),
            last_check_in_at: active.last_check_in_at.unwrap(),
            streak_count: active.streak_count.unwrap(),
            status: active.status.unwrap(),
            created_at: active.created_at.unwrap(),
            updated_at: active.updated_at.unwrap(),
        };

        assert_eq!(model.entitlements, serde_json::json!(["chapter-1", "chapter-2"]));
        assert_eq!(account_from_model(model).unwrap(), account);
    }

    #[test]
    fn test_corrupt_status_is_backend_error() {
        let account = AccountRecord::open(UserId::new(), Utc::now());
        let active = account_to_active(&account).unwrap();
        let model = accounts::Model {
            user_id: active.user_id.unwrap(),
            balance: 0,
            entitlements: serde_json::json!([]),
            last_check_in_at: None,
            streak_count: 0,
            status: "frozen".to_string(),
            created_at: active.created_at.unwrap(),
            updated_at: active.updated_at.unwrap(),
        };
        assert!(matches!(
            account_from_model(model),
            Err(StoreError::Backend(_))
        ));
    }

    #[test]
    fn test_non_sql_errors_are_not_conflicts() {
        let err = map_db_err(DbErr::RecordNotFound("accounts".to_string()));
        assert!(!err.is_conflict());
    }
}
