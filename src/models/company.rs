//! Company entity model
//!
//! This module contains the SeaORM entity model for the companies table.
//! A company is the billing tenant: it owns users, a 30-day billing cycle
//! window and the prices used to compute its invoice.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Company entity representing a billing tenant
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "companies")]
pub struct Model {
    /// Unique identifier for the company (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Display name for the company
    pub name: String,

    /// Approval / billing status
    pub status: CompanyStatus,

    /// Timestamp when the company was registered
    pub created_at: DateTimeWithTimeZone,

    /// Start of the current billing cycle
    pub billing_cycle_start: DateTimeWithTimeZone,

    /// End of the current billing cycle (start + cycle length)
    pub billing_cycle_end: DateTimeWithTimeZone,

    /// When the last cycle was closed manually, if ever
    pub last_cycle_closed_at: Option<DateTimeWithTimeZone>,

    /// Subscription price, includes the owner's seat
    pub base_price: f64,

    /// Price per additional billable member
    pub user_price: f64,
}

/// Company lifecycle status
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum CompanyStatus {
    /// Registered, waiting for platform approval
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,

    #[sea_orm(string_value = "active")]
    Active,

    /// Blocked by the platform admin (usually for non-payment)
    #[sea_orm(string_value = "blocked")]
    Blocked,

    #[sea_orm(string_value = "suspended")]
    Suspended,
}

impl CompanyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompanyStatus::Pending => "pending",
            CompanyStatus::Active => "active",
            CompanyStatus::Blocked => "blocked",
            CompanyStatus::Suspended => "suspended",
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user::Entity")]
    Users,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
