//! # User Repository
//!
//! Lookups, session bookkeeping and billable-flag updates for users.
//! Session writes are single conditional statements so the stored
//! `current_session_id` is the only arbiter of which device holds the session.

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::user::{
    ActiveModel as UserActiveModel, Column, Entity as User, Model as UserModel, UserRole,
    UserStatus, normalize_email,
};

/// Data for a new user row
#[derive(Debug, Clone)]
pub struct NewUser {
    pub company_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub secret: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub billable_in_current_cycle: bool,
}

/// Repository for User database operations
pub struct UserRepository<'a, C = DatabaseConnection> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> UserRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Insert a user. A duplicate email surfaces as a unique violation.
    pub async fn create(&self, request: NewUser) -> Result<UserModel, RepositoryError> {
        let email = request.email.trim().to_string();
        let user = UserActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(request.company_id),
            name: Set(request.name),
            email_normalized: Set(normalize_email(&email)),
            email: Set(email),
            secret: Set(request.secret),
            role: Set(request.role),
            status: Set(request.status),
            billable_in_current_cycle: Set(request.billable_in_current_cycle),
            created_at: Set(Utc::now().into()),
            current_session_id: Set(None),
            last_seen: Set(None),
        };

        user.insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserModel>, RepositoryError> {
        User::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Case-insensitive email lookup
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, RepositoryError> {
        User::find()
            .filter(Column::EmailNormalized.eq(normalize_email(email)))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn email_in_use(&self, email: &str) -> Result<bool, RepositoryError> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    /// The user currently holding `session_id`, if any
    pub async fn find_by_session(
        &self,
        session_id: &str,
    ) -> Result<Option<UserModel>, RepositoryError> {
        User::find()
            .filter(Column::CurrentSessionId.eq(session_id))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Every user, oldest first
    pub async fn list_all(&self) -> Result<Vec<UserModel>, RepositoryError> {
        User::find()
            .order_by_asc(Column::CreatedAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn list_by_company(
        &self,
        company_id: Uuid,
    ) -> Result<Vec<UserModel>, RepositoryError> {
        User::find()
            .filter(Column::CompanyId.eq(company_id))
            .order_by_asc(Column::CreatedAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn admin_exists(&self) -> Result<bool, RepositoryError> {
        let count = User::find()
            .filter(Column::Role.eq(UserRole::AdminMaster))
            .count(self.db)
            .await
            .map_err(RepositoryError::database_error)?;
        Ok(count > 0)
    }

    /// Number of `user`-role members flagged billable in the current cycle.
    /// Owners are covered by the base price and never counted.
    pub async fn count_billable_members(&self, company_id: Uuid) -> Result<u64, RepositoryError> {
        User::find()
            .filter(Column::CompanyId.eq(company_id))
            .filter(Column::Role.eq(UserRole::User))
            .filter(Column::BillableInCurrentCycle.eq(true))
            .count(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Hand the session to `session_id`, preempting whoever held it.
    pub async fn start_session(
        &self,
        user_id: Uuid,
        session_id: &str,
        now: DateTimeWithTimeZone,
    ) -> Result<(), RepositoryError> {
        let result = User::update_many()
            .col_expr(Column::CurrentSessionId, Expr::value(session_id.to_string()))
            .col_expr(Column::LastSeen, Expr::value(now))
            .filter(Column::Id.eq(user_id))
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound(format!("user {}", user_id)));
        }
        Ok(())
    }

    /// Stamp `last_seen` only while `session_id` is still the live session.
    /// Returns whether a row matched.
    pub async fn touch_if_session(
        &self,
        user_id: Uuid,
        session_id: &str,
        now: DateTimeWithTimeZone,
    ) -> Result<bool, RepositoryError> {
        let result = User::update_many()
            .col_expr(Column::LastSeen, Expr::value(now))
            .filter(Column::Id.eq(user_id))
            .filter(Column::CurrentSessionId.eq(session_id))
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result.rows_affected > 0)
    }

    /// Drop the live session and liveness stamp. Unknown ids are a no-op.
    pub async fn clear_session(&self, user_id: Uuid) -> Result<(), RepositoryError> {
        User::update_many()
            .col_expr(Column::CurrentSessionId, Expr::value(Option::<String>::None))
            .col_expr(
                Column::LastSeen,
                Expr::value(Option::<DateTimeWithTimeZone>::None),
            )
            .filter(Column::Id.eq(user_id))
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?;
        Ok(())
    }

    pub async fn set_status(
        &self,
        user: UserModel,
        status: UserStatus,
        billable_in_current_cycle: bool,
    ) -> Result<UserModel, RepositoryError> {
        let mut active = user.into_active_model();
        active.status = Set(status);
        active.billable_in_current_cycle = Set(billable_in_current_cycle);

        active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Re-derive every company user's billable flag from their status.
    pub async fn reset_billable_flags(&self, company_id: Uuid) -> Result<(), RepositoryError> {
        for (status, billable) in [(UserStatus::Active, true), (UserStatus::Inactive, false)] {
            User::update_many()
                .col_expr(Column::BillableInCurrentCycle, Expr::value(billable))
                .filter(Column::CompanyId.eq(company_id))
                .filter(Column::Status.eq(status))
                .exec(self.db)
                .await
                .map_err(RepositoryError::database_error)?;
        }
        Ok(())
    }
}
