//! # Account Engine
//!
//! Login and single-session preemption, heartbeat liveness, billable-user
//! flagging, cycle closing, invoice calculation and company registration.
//!
//! Every operation reads and writes through the repositories, so the
//! database stays the only source of truth. Callers holding a cached view of
//! the account (see [`crate::session_context`]) re-derive it from here.

mod billing;
mod directory;
mod error;
mod registration;
mod session;
mod types;

pub use error::AccountError;
pub use registration::{NewMember, RegistrationRequest};
pub use session::{AuthenticatedSession, InvalidationReason, SessionCheck};
pub use types::{
    AccessFeedEntry, AccessLogEntry, AccountSnapshot, BillingSummary, ClientInfo, CompanyProfile,
    CompanyRevenue, LoginOutcome, RegistrationOutcome, RevenueOverview, UserProfile,
};

use sea_orm::{ConnectionTrait, DatabaseConnection};
use uuid::Uuid;

use crate::config::BillingConfig;
use crate::models::company::{CompanyStatus, Model as CompanyModel};
use crate::models::user::{Model as UserModel, UserRole};
use crate::repositories::{AccessLogRepository, CompanyRepository, UserRepository};

/// Account engine over an injected database connection.
#[derive(Debug, Clone)]
pub struct AccountService {
    db: DatabaseConnection,
    billing: BillingConfig,
}

impl AccountService {
    pub fn new(db: DatabaseConnection, billing: BillingConfig) -> Self {
        Self { db, billing }
    }

    /// The user's profile, company and recent logins.
    pub async fn account_snapshot(&self, user_id: Uuid) -> Result<AccountSnapshot, AccountError> {
        let user = UserRepository::new(&self.db)
            .find_by_id(user_id)
            .await?
            .ok_or(AccountError::UserNotFound(user_id))?;
        let company = load_company(&self.db, &user).await?;
        let access_logs = AccessLogRepository::new(&self.db)
            .list_for_user(user_id)
            .await?
            .into_iter()
            .map(AccessLogEntry::from)
            .collect();

        Ok(AccountSnapshot {
            user: user.into(),
            company: company.map(CompanyProfile::from),
            access_logs,
        })
    }

    pub async fn user_profile(&self, user_id: Uuid) -> Result<UserProfile, AccountError> {
        UserRepository::new(&self.db)
            .find_by_id(user_id)
            .await?
            .map(UserProfile::from)
            .ok_or(AccountError::UserNotFound(user_id))
    }
}

async fn load_company<C: ConnectionTrait>(
    db: &C,
    user: &UserModel,
) -> Result<Option<CompanyModel>, AccountError> {
    match user.company_id {
        Some(company_id) => Ok(CompanyRepository::new(db).find_by_id(company_id).await?),
        None => Ok(None),
    }
}

/// Company gate applied at login. Platform admins pass without a company;
/// suspended companies are still allowed in.
fn check_company_access(
    user: &UserModel,
    company: Option<&CompanyModel>,
) -> Result<(), AccountError> {
    if user.role == UserRole::AdminMaster {
        return Ok(());
    }

    match company.map(|c| c.status) {
        None => Err(AccountError::CompanyUnlinked),
        Some(CompanyStatus::Pending) => Err(AccountError::CompanyPendingApproval),
        Some(CompanyStatus::Blocked) => Err(AccountError::CompanyBlocked),
        Some(CompanyStatus::Active) | Some(CompanyStatus::Suspended) => Ok(()),
    }
}
