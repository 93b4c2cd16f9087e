//! Lead entity model
//!
//! This module contains the SeaORM entity model for the leads table, which
//! stores prospects tracked through the sales funnel.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

/// Lead entity
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "leads")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Company the lead belongs to (None in single-user mode)
    pub company_id: Option<Uuid>,

    /// User who captured the lead
    pub user_id: Option<Uuid>,

    pub name: String,
    pub segment: String,
    pub prospect_type: ProspectType,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub instagram: Option<String>,
    pub site: Option<String>,
    pub recommended_substrate: String,
    pub products_used: String,
    pub estimated_volume: Level,
    pub purchase_frequency: Level,
    pub status: FunnelStatus,

    #[sea_orm(column_type = "Text")]
    pub notes: String,

    /// Free-text history entries, newest first (JSON array of strings)
    #[sea_orm(column_type = "JsonBinary")]
    pub history: JsonValue,

    pub created_at: DateTimeWithTimeZone,
    pub potential: Level,
    pub last_interaction: DateTimeWithTimeZone,
    pub cnpj: Option<String>,
    pub niche: Option<String>,
    pub priority: bool,
    pub legal_name: Option<String>,
    pub trade_name: Option<String>,
    pub address: Option<String>,
    pub cnae: Option<String>,
    pub registration_status: Option<String>,
    pub digital_presence: Option<String>,
    pub whatsapp: Option<String>,
    pub commercial_email: Option<String>,
    pub contact_person: Option<String>,
}

impl Model {
    /// History entries decoded from the JSON column.
    pub fn history_entries(&self) -> Vec<String> {
        serde_json::from_value(self.history.clone()).unwrap_or_default()
    }
}

/// Funnel stage, in board column order
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum FunnelStatus {
    #[sea_orm(string_value = "new")]
    #[default]
    New,

    #[sea_orm(string_value = "contact_initiated")]
    ContactInitiated,

    #[sea_orm(string_value = "in_conversation")]
    InConversation,

    #[sea_orm(string_value = "budget_sent")]
    BudgetSent,

    #[sea_orm(string_value = "negotiation")]
    Negotiation,

    #[sea_orm(string_value = "closed")]
    Closed,

    #[sea_orm(string_value = "lost")]
    Lost,
}

impl FunnelStatus {
    /// Board columns, left to right.
    pub const COLUMNS: [FunnelStatus; 7] = [
        FunnelStatus::New,
        FunnelStatus::ContactInitiated,
        FunnelStatus::InConversation,
        FunnelStatus::BudgetSent,
        FunnelStatus::Negotiation,
        FunnelStatus::Closed,
        FunnelStatus::Lost,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FunnelStatus::New => "New",
            FunnelStatus::ContactInitiated => "Contact initiated",
            FunnelStatus::InConversation => "In conversation",
            FunnelStatus::BudgetSent => "Budget sent",
            FunnelStatus::Negotiation => "Negotiation",
            FunnelStatus::Closed => "Closed",
            FunnelStatus::Lost => "Lost",
        }
    }
}

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
pub enum ProspectType {
    #[sea_orm(string_value = "commercial")]
    #[serde(alias = "comercial")]
    #[default]
    Commercial,

    #[sea_orm(string_value = "industrial")]
    Industrial,
}

/// Low / medium / high estimate used for volume, frequency and potential.
///
/// Accepts the Portuguese labels the prospecting model tends to answer with.
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
pub enum Level {
    #[sea_orm(string_value = "low")]
    #[serde(alias = "Baixo", alias = "Baixa", alias = "Low")]
    Low,

    #[sea_orm(string_value = "medium")]
    #[serde(alias = "Médio", alias = "Média", alias = "Medium")]
    #[default]
    Medium,

    #[sea_orm(string_value = "high")]
    #[serde(alias = "Alto", alias = "Alta", alias = "High")]
    High,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
