//! User entity model
//!
//! This module contains the SeaORM entity model for the users table. A user
//! holds at most one live session: `current_session_id` is overwritten on
//! every login, which preempts any session held elsewhere.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User entity
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning company; `None` only for the platform admin
    pub company_id: Option<Uuid>,

    pub name: String,

    /// Email as entered at signup
    pub email: String,

    /// Lower-cased email, unique across all users
    #[sea_orm(unique)]
    pub email_normalized: String,

    /// Mock secret, never leaves the service layer
    pub secret: String,

    pub role: UserRole,

    pub status: UserStatus,

    /// Billed for the current cycle. Set on every activation, only reset at cycle close
    pub billable_in_current_cycle: bool,

    pub created_at: DateTimeWithTimeZone,

    /// Token of the only session allowed for this user
    pub current_session_id: Option<String>,

    /// Last heartbeat or login
    pub last_seen: Option<DateTimeWithTimeZone>,
}

/// Role tiers
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Platform administrator, not bound to any company
    #[sea_orm(string_value = "admin_master")]
    AdminMaster,

    /// Company owner; the seat is included in the base price
    #[sea_orm(string_value = "owner")]
    Owner,

    /// Company member billed per seat
    #[sea_orm(string_value = "user")]
    User,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    #[sea_orm(string_value = "active")]
    Active,

    #[sea_orm(string_value = "inactive")]
    Inactive,
}

impl UserStatus {
    /// The other status
    pub fn toggled(self) -> Self {
        match self {
            UserStatus::Active => UserStatus::Inactive,
            UserStatus::Inactive => UserStatus::Active,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::company::Entity",
        from = "Column::CompanyId",
        to = "super::company::Column::Id"
    )]
    Company,

    #[sea_orm(has_many = "super::access_log::Entity")]
    AccessLogs,
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl Related<super::access_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccessLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Normalize an email for lookups and the uniqueness index.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_lowercases_and_trims() {
        assert_eq!(normalize_email("  Ana@Example.COM "), "ana@example.com");
    }

    #[test]
    fn status_toggles_both_ways() {
        assert_eq!(UserStatus::Active.toggled(), UserStatus::Inactive);
        assert_eq!(UserStatus::Inactive.toggled(), UserStatus::Active);
    }
}
