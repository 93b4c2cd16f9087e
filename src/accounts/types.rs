//! Data transfer types returned by the account engine.
//!
//! None of these carry the user secret.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::company::{CompanyStatus, Model as CompanyModel};
use crate::models::user::{Model as UserModel, UserRole, UserStatus};
use crate::models::access_log::Model as AccessLogModel;

/// Client details recorded with every login
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ClientInfo {
    pub user_agent: String,
    pub ip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    pub company_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub billable_in_current_cycle: bool,
    pub created_at: DateTime<Utc>,
    pub last_seen: Option<DateTime<Utc>>,
}

impl From<UserModel> for UserProfile {
    fn from(user: UserModel) -> Self {
        Self {
            id: user.id,
            company_id: user.company_id,
            name: user.name,
            email: user.email,
            role: user.role,
            status: user.status,
            billable_in_current_cycle: user.billable_in_current_cycle,
            created_at: user.created_at.with_timezone(&Utc),
            last_seen: user.last_seen.map(|ts| ts.with_timezone(&Utc)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CompanyProfile {
    pub id: Uuid,
    pub name: String,
    pub status: CompanyStatus,
    pub created_at: DateTime<Utc>,
    pub billing_cycle_start: DateTime<Utc>,
    pub billing_cycle_end: DateTime<Utc>,
    pub last_cycle_closed_at: Option<DateTime<Utc>>,
    pub base_price: f64,
    pub user_price: f64,
}

impl From<CompanyModel> for CompanyProfile {
    fn from(company: CompanyModel) -> Self {
        Self {
            id: company.id,
            name: company.name,
            status: company.status,
            created_at: company.created_at.with_timezone(&Utc),
            billing_cycle_start: company.billing_cycle_start.with_timezone(&Utc),
            billing_cycle_end: company.billing_cycle_end.with_timezone(&Utc),
            last_cycle_closed_at: company.last_cycle_closed_at.map(|ts| ts.with_timezone(&Utc)),
            base_price: company.base_price,
            user_price: company.user_price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AccessLogEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub user_agent: String,
    pub ip: String,
}

impl From<AccessLogModel> for AccessLogEntry {
    fn from(log: AccessLogModel) -> Self {
        Self {
            id: log.id,
            timestamp: log.timestamp.with_timezone(&Utc),
            user_agent: log.user_agent,
            ip: log.ip,
        }
    }
}

/// A user with their company and recent logins
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccountSnapshot {
    pub user: UserProfile,
    pub company: Option<CompanyProfile>,
    /// Newest first
    pub access_logs: Vec<AccessLogEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginOutcome {
    /// Token to present on every later call
    pub session_id: String,
    #[serde(flatten)]
    pub account: AccountSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegistrationOutcome {
    pub company: CompanyProfile,
    pub owner: UserProfile,
}

/// Invoice breakdown for the current cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BillingSummary {
    pub company_id: Uuid,
    pub base_price: f64,
    pub user_price: f64,
    pub billable_members: u64,
    pub total: f64,
    pub billing_cycle_start: DateTime<Utc>,
    pub billing_cycle_end: DateTime<Utc>,
    pub last_cycle_closed_at: Option<DateTime<Utc>>,
    /// The cycle ended and has not been closed yet
    pub overdue: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CompanyRevenue {
    pub company_id: Uuid,
    pub name: String,
    pub status: CompanyStatus,
    pub total: f64,
    pub overdue: bool,
}

/// Platform-wide revenue for the admin dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RevenueOverview {
    pub company_count: u64,
    pub total_revenue: f64,
    pub average_revenue: f64,
    pub companies: Vec<CompanyRevenue>,
}

/// One login in the platform-wide access feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AccessFeedEntry {
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub company_id: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
    pub user_agent: String,
    pub ip: String,
}
