//! Company sign-up, member creation and the platform admin bootstrap.

use chrono::Utc;
use sea_orm::TransactionTrait;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{AccountError, AccountService, CompanyProfile, RegistrationOutcome, UserProfile};
use crate::error::RepositoryError;
use crate::models::company::CompanyStatus;
use crate::models::user::{UserRole, UserStatus};
use crate::repositories::{CompanyRepository, NewCompany, NewUser, UserRepository};

/// Self-service sign-up for a new company and its owner
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegistrationRequest {
    pub company_name: String,
    pub owner_name: String,
    pub email: String,
    pub secret: String,
}

/// Member added by a company owner
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewMember {
    pub name: String,
    pub email: String,
    pub secret: String,
}

impl AccountService {
    /// Create a pending company with a fresh cycle and its billable owner.
    pub async fn register_company_request(
        &self,
        request: RegistrationRequest,
    ) -> Result<RegistrationOutcome, AccountError> {
        require_non_empty("company name", &request.company_name)?;
        validate_identity(&request.owner_name, &request.email, &request.secret)?;

        if UserRepository::new(&self.db)
            .email_in_use(&request.email)
            .await?
        {
            return Err(AccountError::EmailAlreadyInUse);
        }

        let now: DateTimeWithTimeZone = Utc::now().into();
        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;

        let company = CompanyRepository::new(&txn)
            .create(NewCompany {
                name: request.company_name.trim().to_string(),
                status: CompanyStatus::Pending,
                billing_cycle_start: now,
                billing_cycle_end: now + self.billing.cycle_length(),
                base_price: self.billing.base_price,
                user_price: self.billing.user_price,
            })
            .await?;

        let owner = UserRepository::new(&txn)
            .create(NewUser {
                company_id: Some(company.id),
                name: request.owner_name.trim().to_string(),
                email: request.email,
                secret: request.secret,
                role: UserRole::Owner,
                status: UserStatus::Active,
                billable_in_current_cycle: true,
            })
            .await
            .map_err(email_conflict)?;

        txn.commit().await.map_err(RepositoryError::database_error)?;

        info!(company_id = %company.id, owner_id = %owner.id, "Company registration requested");
        Ok(RegistrationOutcome {
            company: CompanyProfile::from(company),
            owner: UserProfile::from(owner),
        })
    }

    /// Add an active member, billable from the moment it exists.
    pub async fn owner_create_user(
        &self,
        company_id: Uuid,
        member: NewMember,
    ) -> Result<UserProfile, AccountError> {
        validate_identity(&member.name, &member.email, &member.secret)?;

        if CompanyRepository::new(&self.db)
            .find_by_id(company_id)
            .await?
            .is_none()
        {
            return Err(AccountError::CompanyNotFound(company_id));
        }

        let users = UserRepository::new(&self.db);
        if users.email_in_use(&member.email).await? {
            return Err(AccountError::EmailAlreadyInUse);
        }

        let user = users
            .create(NewUser {
                company_id: Some(company_id),
                name: member.name.trim().to_string(),
                email: member.email,
                secret: member.secret,
                role: UserRole::User,
                status: UserStatus::Active,
                billable_in_current_cycle: true,
            })
            .await
            .map_err(email_conflict)?;

        info!(%company_id, user_id = %user.id, "Member created");
        Ok(user.into())
    }

    /// Insert the platform admin unless one exists. Returns the new admin.
    pub async fn seed_admin_master(
        &self,
        email: &str,
        secret: &str,
    ) -> Result<Option<UserProfile>, AccountError> {
        let users = UserRepository::new(&self.db);
        if users.admin_exists().await? {
            return Ok(None);
        }
        validate_identity("Admin Master", email, secret)?;

        let admin = users
            .create(NewUser {
                company_id: None,
                name: "Admin Master".to_string(),
                email: email.to_string(),
                secret: secret.to_string(),
                role: UserRole::AdminMaster,
                status: UserStatus::Active,
                billable_in_current_cycle: false,
            })
            .await
            .map_err(email_conflict)?;

        info!(user_id = %admin.id, "Platform admin seeded");
        Ok(Some(admin.into()))
    }
}

/// A racing insert that hit the email index is still a duplicate email.
fn email_conflict(err: RepositoryError) -> AccountError {
    if err.is_unique_violation() {
        AccountError::EmailAlreadyInUse
    } else {
        err.into()
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), AccountError> {
    if value.trim().is_empty() {
        return Err(AccountError::Validation(format!("{field} is required")));
    }
    Ok(())
}

fn validate_identity(name: &str, email: &str, secret: &str) -> Result<(), AccountError> {
    require_non_empty("name", name)?;
    require_non_empty("email", email)?;
    require_non_empty("password", secret)?;

    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(AccountError::Validation(format!(
            "'{email}' is not a valid email address"
        ))),
    }
}
