//! # Company Repository
//!
//! CRUD and billing-cycle bookkeeping for company (tenant) records.

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::company::{
    ActiveModel as CompanyActiveModel, Column, CompanyStatus, Entity as Company,
    Model as CompanyModel,
};

/// Data for a new company row
#[derive(Debug, Clone)]
pub struct NewCompany {
    pub name: String,
    pub status: CompanyStatus,
    pub billing_cycle_start: DateTimeWithTimeZone,
    pub billing_cycle_end: DateTimeWithTimeZone,
    pub base_price: f64,
    pub user_price: f64,
}

/// Repository for Company database operations.
///
/// Generic over the connection so the same queries run against the pool or
/// inside a transaction.
pub struct CompanyRepository<'a, C = DatabaseConnection> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> CompanyRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Insert a new company
    pub async fn create(&self, request: NewCompany) -> Result<CompanyModel, RepositoryError> {
        if request.name.trim().is_empty() {
            return Err(RepositoryError::validation_error(
                "company name cannot be empty",
            ));
        }

        let company = CompanyActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            status: Set(request.status),
            created_at: Set(Utc::now().into()),
            billing_cycle_start: Set(request.billing_cycle_start),
            billing_cycle_end: Set(request.billing_cycle_end),
            last_cycle_closed_at: Set(None),
            base_price: Set(request.base_price),
            user_price: Set(request.user_price),
        };

        company
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<CompanyModel>, RepositoryError> {
        Company::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// All companies, oldest first
    pub async fn list(&self) -> Result<Vec<CompanyModel>, RepositoryError> {
        Company::find()
            .order_by_asc(Column::CreatedAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Overwrite the status; any status may follow any other.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: CompanyStatus,
    ) -> Result<CompanyModel, RepositoryError> {
        let company = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("company {}", id)))?;

        let mut active = company.into_active_model();
        active.status = Set(status);

        active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Start a new billing window at `closed_at` and record the close.
    pub async fn restart_cycle(
        &self,
        id: Uuid,
        closed_at: DateTimeWithTimeZone,
        cycle_end: DateTimeWithTimeZone,
    ) -> Result<CompanyModel, RepositoryError> {
        let company = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("company {}", id)))?;

        let mut active = company.into_active_model();
        active.last_cycle_closed_at = Set(Some(closed_at));
        active.billing_cycle_start = Set(closed_at);
        active.billing_cycle_end = Set(cycle_end);

        active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}
