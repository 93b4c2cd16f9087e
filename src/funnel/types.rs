use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::lead::{FunnelStatus, Level, Model as LeadModel, ProspectType};

/// A lead as exposed to callers, history decoded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LeadRecord {
    pub id: Uuid,
    pub company_id: Option<Uuid>,
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
    pub notes: String,
    /// Newest first
    pub history: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub potential: Level,
    pub last_interaction: DateTime<Utc>,
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

impl From<LeadModel> for LeadRecord {
    fn from(model: LeadModel) -> Self {
        let history = model.history_entries();
        Self {
            id: model.id,
            company_id: model.company_id,
            user_id: model.user_id,
            name: model.name,
            segment: model.segment,
            prospect_type: model.prospect_type,
            city: model.city,
            state: model.state,
            phone: model.phone,
            instagram: model.instagram,
            site: model.site,
            recommended_substrate: model.recommended_substrate,
            products_used: model.products_used,
            estimated_volume: model.estimated_volume,
            purchase_frequency: model.purchase_frequency,
            status: model.status,
            notes: model.notes,
            history,
            created_at: model.created_at.with_timezone(&Utc),
            potential: model.potential,
            last_interaction: model.last_interaction.with_timezone(&Utc),
            cnpj: model.cnpj,
            niche: model.niche,
            priority: model.priority,
            legal_name: model.legal_name,
            trade_name: model.trade_name,
            address: model.address,
            cnae: model.cnae,
            registration_status: model.registration_status,
            digital_presence: model.digital_presence,
            whatsapp: model.whatsapp,
            commercial_email: model.commercial_email,
            contact_person: model.contact_person,
        }
    }
}

/// Lead typed in by hand. Omitted fields take the manual-entry defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ManualLead {
    pub name: String,
    pub segment: String,
    pub prospect_type: Option<ProspectType>,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub instagram: Option<String>,
    pub site: Option<String>,
    pub recommended_substrate: String,
    pub products_used: String,
    pub estimated_volume: Option<Level>,
    pub purchase_frequency: Option<Level>,
    pub status: Option<FunnelStatus>,
    pub notes: String,
    pub potential: Option<Level>,
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

/// Editable lead fields for a full replace
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeadUpdate {
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
    pub notes: String,
    pub history: Vec<String>,
    pub potential: Level,
    pub last_interaction: DateTime<Utc>,
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

impl From<LeadRecord> for LeadUpdate {
    fn from(record: LeadRecord) -> Self {
        Self {
            name: record.name,
            segment: record.segment,
            prospect_type: record.prospect_type,
            city: record.city,
            state: record.state,
            phone: record.phone,
            instagram: record.instagram,
            site: record.site,
            recommended_substrate: record.recommended_substrate,
            products_used: record.products_used,
            estimated_volume: record.estimated_volume,
            purchase_frequency: record.purchase_frequency,
            status: record.status,
            notes: record.notes,
            history: record.history,
            potential: record.potential,
            last_interaction: record.last_interaction,
            cnpj: record.cnpj,
            niche: record.niche,
            priority: record.priority,
            legal_name: record.legal_name,
            trade_name: record.trade_name,
            address: record.address,
            cnae: record.cnae,
            registration_status: record.registration_status,
            digital_presence: record.digital_presence,
            whatsapp: record.whatsapp,
            commercial_email: record.commercial_email,
            contact_person: record.contact_person,
        }
    }
}

/// Who captured a lead
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LeadOwner {
    pub company_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

/// Which leads a caller may see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadScope {
    /// Every lead on the platform
    All,
    Company(Uuid),
}

impl LeadScope {
    pub(crate) fn company_filter(&self) -> Option<Uuid> {
        match self {
            LeadScope::All => None,
            LeadScope::Company(id) => Some(*id),
        }
    }

    pub(crate) fn permits(&self, lead: &crate::models::lead::Model) -> bool {
        match self {
            LeadScope::All => true,
            LeadScope::Company(id) => lead.company_id == Some(*id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BoardColumn {
    pub status: FunnelStatus,
    pub label: String,
    pub leads: Vec<LeadRecord>,
}

/// Leads grouped by funnel stage, columns in funnel order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LeadBoard {
    pub columns: Vec<BoardColumn>,
}
