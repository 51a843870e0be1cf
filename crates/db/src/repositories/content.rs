//! Content catalog repository.

use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};

use inkwell_core::ContentItem;

use crate::entities::{content_unlocks, contents};

/// Catalog repository used by the seeder and admin tooling.
#[derive(Debug, Clone)]
pub struct ContentRepository {
    db: DatabaseConnection,
}

impl ContentRepository {
    /// Creates a new content repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts a content item or updates its unlock cost.
    ///
    /// # Errors
    ///
    /// Returns an error if the database upsert fails.
    pub async fn upsert(&self, item: &ContentItem) -> Result<(), DbErr> {
        let now = chrono::Utc::now().fixed_offset();
        let model = contents::ActiveModel {
            id: Set(item.id.as_str().to_string()),
            unlock_cost: Set(item.unlock_cost),
            created_at: Set(now),
            updated_at: Set(now),
        };

        contents::Entity::insert(model)
            .on_conflict(
                OnConflict::column(contents::Column::Id)
                    .update_columns([contents::Column::UnlockCost, contents::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Lists the catalog ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<contents::Model>, DbErr> {
        contents::Entity::find()
            .order_by_asc(contents::Column::Id)
            .all(&self.db)
            .await
    }

    /// Returns how many times a content item has been unlocked, or `None`
    /// if it is not in the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn unlock_count(&self, id: &str) -> Result<Option<u64>, DbErr> {
        let exists = contents::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?
            .is_some();
        if !exists {
            return Ok(None);
        }

        let count = content_unlocks::Entity::find()
            .filter(content_unlocks::Column::ContentId.eq(id))
            .count(&self.db)
            .await?;
        Ok(Some(count))
    }
}
