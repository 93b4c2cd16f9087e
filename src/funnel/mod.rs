//! # Sales Funnel
//!
//! Leads captured from prospect discovery or typed in by hand, moved through
//! the funnel stages and shown as a board.

mod types;

pub use types::{
    BoardColumn, LeadBoard, LeadOwner, LeadRecord, LeadScope, LeadUpdate, ManualLead,
};

use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, Set};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::assistant::PotentialLead;
use crate::error::RepositoryError;
use crate::models::lead::{
    ActiveModel as LeadActiveModel, FunnelStatus, Level, Model as LeadModel, ProspectType,
};
use crate::repositories::LeadRepository;

#[derive(Debug, Error)]
pub enum FunnelError {
    #[error("Lead {0} not found")]
    LeadNotFound(Uuid),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Clone)]
pub struct FunnelService {
    db: DatabaseConnection,
}

impl FunnelService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Move a discovered prospect into the funnel as a new lead.
    pub async fn add_prospect(
        &self,
        prospect: PotentialLead,
        prospect_type: ProspectType,
        city: &str,
        state: &str,
        owner: LeadOwner,
    ) -> Result<LeadRecord, FunnelError> {
        require("name", &prospect.name)?;
        let now = Utc::now();

        let lead = LeadActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(owner.company_id),
            user_id: Set(owner.user_id),
            trade_name: Set(Some(prospect.name.clone())),
            name: Set(prospect.name),
            segment: Set(prospect.segment),
            prospect_type: Set(prospect_type),
            city: Set(city.to_string()),
            state: Set(state.to_string()),
            phone: Set(prospect.phone),
            instagram: Set(prospect.instagram),
            site: Set(prospect.site),
            recommended_substrate: Set(prospect.recommended_substrate),
            products_used: Set(prospect.products_used),
            estimated_volume: Set(prospect.estimated_volume),
            purchase_frequency: Set(prospect.purchase_frequency),
            status: Set(FunnelStatus::New),
            notes: Set(String::new()),
            history: Set(serde_json::json!([format!("Prospected at {}", stamp(now))])),
            created_at: Set(now.into()),
            potential: Set(prospect.estimated_volume),
            last_interaction: Set(now.into()),
            cnpj: Set(None),
            niche: Set(None),
            priority: Set(false),
            legal_name: Set(None),
            address: Set(None),
            cnae: Set(None),
            registration_status: Set(Some("Ativo".to_string())),
            digital_presence: Set(Some("Média".to_string())),
            whatsapp: Set(None),
            commercial_email: Set(None),
            contact_person: Set(None),
        };

        let lead = LeadRepository::new(&self.db).create(lead).await?;
        info!(lead_id = %lead.id, "Prospect added to funnel");
        Ok(lead.into())
    }

    /// Create a lead from hand-entered data.
    pub async fn add_manual_lead(
        &self,
        manual: ManualLead,
        owner: LeadOwner,
    ) -> Result<LeadRecord, FunnelError> {
        require("name", &manual.name)?;
        let now = Utc::now();

        let lead = LeadActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(owner.company_id),
            user_id: Set(owner.user_id),
            name: Set(manual.name),
            segment: Set(manual.segment),
            prospect_type: Set(manual.prospect_type.unwrap_or(ProspectType::Commercial)),
            city: Set(manual.city),
            state: Set(manual.state),
            phone: Set(manual.phone),
            instagram: Set(manual.instagram),
            site: Set(manual.site),
            recommended_substrate: Set(manual.recommended_substrate),
            products_used: Set(manual.products_used),
            estimated_volume: Set(manual.estimated_volume.unwrap_or(Level::Medium)),
            purchase_frequency: Set(manual.purchase_frequency.unwrap_or(Level::Medium)),
            status: Set(manual.status.unwrap_or(FunnelStatus::New)),
            notes: Set(manual.notes),
            history: Set(serde_json::json!([format!(
                "Lead created manually at {}",
                stamp(now)
            )])),
            created_at: Set(now.into()),
            potential: Set(manual.potential.unwrap_or(Level::Medium)),
            last_interaction: Set(now.into()),
            cnpj: Set(manual.cnpj),
            niche: Set(manual.niche),
            priority: Set(manual.priority),
            legal_name: Set(manual.legal_name),
            trade_name: Set(manual.trade_name),
            address: Set(manual.address),
            cnae: Set(manual.cnae),
            registration_status: Set(manual.registration_status.or(Some("Ativo".to_string()))),
            digital_presence: Set(manual
                .digital_presence
                .or(Some("Não informada".to_string()))),
            whatsapp: Set(manual.whatsapp),
            commercial_email: Set(manual.commercial_email),
            contact_person: Set(manual.contact_person),
        };

        let lead = LeadRepository::new(&self.db).create(lead).await?;
        info!(lead_id = %lead.id, "Manual lead added to funnel");
        Ok(lead.into())
    }

    /// Move a lead to another stage, recording the change in its history.
    pub async fn update_status(
        &self,
        lead_id: Uuid,
        status: FunnelStatus,
        scope: LeadScope,
    ) -> Result<LeadRecord, FunnelError> {
        let mut lead = self.load(lead_id, scope).await?;

        let mut history = lead.history_entries();
        history.insert(0, format!("Status changed to {}", status.label()));

        lead.status = status;
        lead.last_interaction = Utc::now().into();
        lead.history = serde_json::json!(history);

        let lead = LeadRepository::new(&self.db).replace(lead).await?;
        info!(lead_id = %lead.id, status = status.label(), "Lead status updated");
        Ok(lead.into())
    }

    /// Replace every editable field of a lead.
    pub async fn update_lead(
        &self,
        lead_id: Uuid,
        update: LeadUpdate,
        scope: LeadScope,
    ) -> Result<LeadRecord, FunnelError> {
        require("name", &update.name)?;
        let stored = self.load(lead_id, scope).await?;

        let lead = LeadModel {
            id: stored.id,
            company_id: stored.company_id,
            user_id: stored.user_id,
            created_at: stored.created_at,
            name: update.name,
            segment: update.segment,
            prospect_type: update.prospect_type,
            city: update.city,
            state: update.state,
            phone: update.phone,
            instagram: update.instagram,
            site: update.site,
            recommended_substrate: update.recommended_substrate,
            products_used: update.products_used,
            estimated_volume: update.estimated_volume,
            purchase_frequency: update.purchase_frequency,
            status: update.status,
            notes: update.notes,
            history: serde_json::json!(update.history),
            potential: update.potential,
            last_interaction: update.last_interaction.into(),
            cnpj: update.cnpj,
            niche: update.niche,
            priority: update.priority,
            legal_name: update.legal_name,
            trade_name: update.trade_name,
            address: update.address,
            cnae: update.cnae,
            registration_status: update.registration_status,
            digital_presence: update.digital_presence,
            whatsapp: update.whatsapp,
            commercial_email: update.commercial_email,
            contact_person: update.contact_person,
        };

        Ok(LeadRepository::new(&self.db).replace(lead).await?.into())
    }

    pub async fn get(&self, lead_id: Uuid, scope: LeadScope) -> Result<LeadRecord, FunnelError> {
        Ok(self.load(lead_id, scope).await?.into())
    }

    /// Leads visible in `scope`, newest first.
    pub async fn list(&self, scope: LeadScope) -> Result<Vec<LeadRecord>, FunnelError> {
        Ok(LeadRepository::new(&self.db)
            .list(scope.company_filter())
            .await?
            .into_iter()
            .map(LeadRecord::from)
            .collect())
    }

    /// Leads grouped into one column per funnel stage.
    pub async fn board(&self, scope: LeadScope) -> Result<LeadBoard, FunnelError> {
        let leads = self.list(scope).await?;

        let columns = FunnelStatus::COLUMNS
            .iter()
            .map(|status| BoardColumn {
                status: *status,
                label: status.label().to_string(),
                leads: leads
                    .iter()
                    .filter(|lead| lead.status == *status)
                    .cloned()
                    .collect(),
            })
            .collect();

        Ok(LeadBoard { columns })
    }

    /// Leads outside the caller's scope read as missing.
    async fn load(&self, lead_id: Uuid, scope: LeadScope) -> Result<LeadModel, FunnelError> {
        LeadRepository::new(&self.db)
            .find_by_id(lead_id)
            .await?
            .filter(|lead| scope.permits(lead))
            .ok_or(FunnelError::LeadNotFound(lead_id))
    }
}

fn require(field: &str, value: &str) -> Result<(), FunnelError> {
    if value.trim().is_empty() {
        return Err(FunnelError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

fn stamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_rejects_blank() {
        assert!(matches!(require("name", "  "), Err(FunnelError::Validation(_))));
        assert!(require("name", "Padaria Central").is_ok());
    }

    #[test]
    fn scope_permits_only_own_company() {
        let company = Uuid::new_v4();
        let scope = LeadScope::Company(company);
        assert_eq!(scope.company_filter(), Some(company));
        assert_eq!(LeadScope::All.company_filter(), None);
    }
}
