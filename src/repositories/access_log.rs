//! # Access Log Repository
//!
//! Login history, capped per user.

use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::access_log::{
    ActiveModel as AccessLogActiveModel, Column, Entity as AccessLog, Model as AccessLogModel,
};

/// Entries kept per user; older ones are evicted on insert.
pub const MAX_ACCESS_LOGS_PER_USER: usize = 10;

pub struct AccessLogRepository<'a, C = DatabaseConnection> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> AccessLogRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Append an entry and evict everything past the newest
    /// [`MAX_ACCESS_LOGS_PER_USER`].
    pub async fn record(
        &self,
        user_id: Uuid,
        timestamp: DateTimeWithTimeZone,
        user_agent: String,
        ip: String,
    ) -> Result<AccessLogModel, RepositoryError> {
        let entry = AccessLogActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            timestamp: Set(timestamp),
            user_agent: Set(user_agent),
            ip: Set(ip),
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)?;

        // The new entry always survives, even when older ones share its timestamp.
        let evicted: Vec<Uuid> = self
            .list_for_user(user_id)
            .await?
            .into_iter()
            .filter(|log| log.id != entry.id)
            .skip(MAX_ACCESS_LOGS_PER_USER - 1)
            .map(|log| log.id)
            .collect();

        if !evicted.is_empty() {
            AccessLog::delete_many()
                .filter(Column::Id.is_in(evicted))
                .exec(self.db)
                .await
                .map_err(RepositoryError::database_error)?;
        }

        Ok(entry)
    }

    /// A user's entries, newest first
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<AccessLogModel>, RepositoryError> {
        AccessLog::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_desc(Column::Timestamp)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Every entry across users, newest first
    pub async fn list_all(&self) -> Result<Vec<AccessLogModel>, RepositoryError> {
        AccessLog::find()
            .order_by_desc(Column::Timestamp)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}
