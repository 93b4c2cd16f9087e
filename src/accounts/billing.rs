//! Invoice calculation, billable flags and cycle management.
//!
//! A member who is active at any point of a cycle is billed for the whole
//! cycle: activation sets the billable flag, deactivation never clears it.
//! Only a cycle close re-derives the flags from the current status.

use chrono::{DateTime, Utc};
use sea_orm::TransactionTrait;
use sea_orm::prelude::DateTimeWithTimeZone;
use tracing::info;
use uuid::Uuid;

use super::{
    AccountError, AccountService, BillingSummary, CompanyProfile, CompanyRevenue,
    RevenueOverview, UserProfile,
};
use crate::error::RepositoryError;
use crate::models::company::{CompanyStatus, Model as CompanyModel};
use crate::models::user::UserStatus;
use crate::repositories::{CompanyRepository, UserRepository};

impl AccountService {
    /// `base_price + billable members × user_price`. Unknown companies bill 0.
    pub async fn calculate_billing(&self, company_id: Uuid) -> Result<f64, AccountError> {
        let Some(company) = CompanyRepository::new(&self.db)
            .find_by_id(company_id)
            .await?
        else {
            return Ok(0.0);
        };

        Ok(self.summarize(&company, Utc::now()).await?.total)
    }

    pub async fn billing_summary(&self, company_id: Uuid) -> Result<BillingSummary, AccountError> {
        let company = CompanyRepository::new(&self.db)
            .find_by_id(company_id)
            .await?
            .ok_or(AccountError::CompanyNotFound(company_id))?;

        self.summarize(&company, Utc::now()).await
    }

    /// Revenue across every company, with the per-company average.
    pub async fn revenue_overview(&self) -> Result<RevenueOverview, AccountError> {
        let now = Utc::now();
        let companies = CompanyRepository::new(&self.db).list().await?;

        let mut rows = Vec::with_capacity(companies.len());
        for company in &companies {
            let summary = self.summarize(company, now).await?;
            rows.push(CompanyRevenue {
                company_id: company.id,
                name: company.name.clone(),
                status: company.status,
                total: summary.total,
                overdue: summary.overdue,
            });
        }

        let total_revenue: f64 = rows.iter().map(|row| row.total).sum();
        let average_revenue = if rows.is_empty() {
            0.0
        } else {
            total_revenue / rows.len() as f64
        };

        Ok(RevenueOverview {
            company_count: rows.len() as u64,
            total_revenue,
            average_revenue,
            companies: rows,
        })
    }

    /// Flip a member between active and inactive.
    pub async fn owner_toggle_user_status(
        &self,
        user_id: Uuid,
    ) -> Result<UserProfile, AccountError> {
        let users = UserRepository::new(&self.db);
        let user = users
            .find_by_id(user_id)
            .await?
            .ok_or(AccountError::UserNotFound(user_id))?;

        let status = user.status.toggled();
        let billable = match status {
            UserStatus::Active => true,
            UserStatus::Inactive => user.billable_in_current_cycle,
        };

        let updated = users.set_status(user, status, billable).await?;
        info!(%user_id, status = ?updated.status, billable, "User status toggled");

        Ok(updated.into())
    }

    /// Close the current cycle now and start the next one.
    pub async fn master_close_cycle_manually(
        &self,
        company_id: Uuid,
    ) -> Result<CompanyProfile, AccountError> {
        let closed_at: DateTimeWithTimeZone = Utc::now().into();
        let cycle_end = closed_at + self.billing.cycle_length();

        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;

        let company = match CompanyRepository::new(&txn)
            .restart_cycle(company_id, closed_at, cycle_end)
            .await
        {
            Ok(company) => company,
            Err(RepositoryError::NotFound(_)) => {
                return Err(AccountError::CompanyNotFound(company_id));
            }
            Err(err) => return Err(err.into()),
        };
        UserRepository::new(&txn)
            .reset_billable_flags(company_id)
            .await?;

        txn.commit().await.map_err(RepositoryError::database_error)?;

        info!(%company_id, cycle_end = %company.billing_cycle_end, "Billing cycle closed");
        Ok(company.into())
    }

    /// Overwrite a company's status. Every transition is allowed.
    pub async fn master_update_company_status(
        &self,
        company_id: Uuid,
        status: CompanyStatus,
    ) -> Result<CompanyProfile, AccountError> {
        let company = match CompanyRepository::new(&self.db)
            .update_status(company_id, status)
            .await
        {
            Ok(company) => company,
            Err(RepositoryError::NotFound(_)) => {
                return Err(AccountError::CompanyNotFound(company_id));
            }
            Err(err) => return Err(err.into()),
        };

        info!(%company_id, status = status.as_str(), "Company status updated");
        Ok(company.into())
    }

    async fn summarize(
        &self,
        company: &CompanyModel,
        now: DateTime<Utc>,
    ) -> Result<BillingSummary, AccountError> {
        let billable_members = UserRepository::new(&self.db)
            .count_billable_members(company.id)
            .await?;

        Ok(invoice(company, billable_members, now))
    }
}

fn invoice(company: &CompanyModel, billable_members: u64, now: DateTime<Utc>) -> BillingSummary {
    let billing_cycle_end = company.billing_cycle_end.with_timezone(&Utc);
    BillingSummary {
        company_id: company.id,
        base_price: company.base_price,
        user_price: company.user_price,
        billable_members,
        total: company.base_price + billable_members as f64 * company.user_price,
        billing_cycle_start: company.billing_cycle_start.with_timezone(&Utc),
        billing_cycle_end,
        last_cycle_closed_at: company
            .last_cycle_closed_at
            .map(|ts| ts.with_timezone(&Utc)),
        overdue: now > billing_cycle_end,
    }
}
