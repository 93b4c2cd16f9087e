//! # Lead Repository

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::lead::{ActiveModel as LeadActiveModel, Column, Entity as Lead, Model as LeadModel};

pub struct LeadRepository<'a, C = DatabaseConnection> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> LeadRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn create(&self, lead: LeadActiveModel) -> Result<LeadModel, RepositoryError> {
        lead.insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<LeadModel>, RepositoryError> {
        Lead::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Leads newest first; `None` lists across every company.
    pub async fn list(&self, company_id: Option<Uuid>) -> Result<Vec<LeadModel>, RepositoryError> {
        let mut query = Lead::find();
        if let Some(company_id) = company_id {
            query = query.filter(Column::CompanyId.eq(company_id));
        }

        query
            .order_by_desc(Column::CreatedAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Replace every column of an existing lead.
    pub async fn replace(&self, lead: LeadModel) -> Result<LeadModel, RepositoryError> {
        let active: LeadActiveModel = lead.into();
        active
            .reset_all()
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}
