//! Request and response shapes exchanged with the prospecting assistant.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::lead::{Level, ProspectType};

/// Company suggested by prospect discovery, not yet in the funnel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PotentialLead {
    pub name: String,
    pub segment: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub site: Option<String>,
    pub recommended_substrate: String,
    pub products_used: String,
    #[serde(default)]
    pub estimated_volume: Level,
    #[serde(default)]
    pub purchase_frequency: Level,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

/// Prospect discovery criteria
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProspectQuery {
    pub segment: String,
    /// Free-text segment, used when `segment` is "Outro"
    #[serde(default)]
    pub custom_segment: Option<String>,
    pub city: String,
    pub state: String,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub radius: Option<String>,
    #[serde(default)]
    pub niche: Option<String>,
    #[serde(default)]
    pub keywords: Option<String>,
}

impl ProspectQuery {
    /// Zero-based position of the first result on the requested page.
    pub fn offset(&self) -> u32 {
        self.page.max(1).saturating_sub(1).saturating_mul(self.limit)
    }

    /// The user-defined segment, when one was given in place of a catalog entry.
    pub fn custom_segment(&self) -> Option<&str> {
        custom_segment(&self.segment, self.custom_segment.as_deref())
    }
}

/// The free-text segment applies only when the catalog choice is "Outro".
pub(crate) fn custom_segment<'a>(segment: &str, custom: Option<&'a str>) -> Option<&'a str> {
    if segment != super::catalog::OTHER_SEGMENT {
        return None;
    }
    custom.map(str::trim).filter(|text| !text.is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProspectSearchResult {
    pub prospects: Vec<PotentialLead>,
    /// Estimated total matches before pagination
    pub total: u64,
}

/// Outreach scripts for a prospect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Scripts {
    pub whatsapp: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TechnicalAnalysis {
    pub probable_materials: Vec<String>,
    pub usage_evidence: String,
    pub potential_risks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CommercialAnalysis {
    pub opportunity_summary: String,
    pub key_benefits: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ObjectionHandling {
    pub objection: String,
    pub response: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnalysisScripts {
    pub whatsapp: String,
    pub phone_pitch: String,
    pub email_template: String,
    #[serde(default)]
    pub objections_handling: Vec<ObjectionHandling>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Decisor {
    pub name: String,
    pub role: String,
    pub linkedin_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Connections {
    pub linkedin_company_url: String,
    pub potential_decisors: Vec<Decisor>,
    pub influence_map: String,
}

/// Deep sales-engineering analysis of a prospect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LeadAnalysis {
    pub technical: TechnicalAnalysis,
    pub commercial: CommercialAnalysis,
    pub scripts: AnalysisScripts,
    pub connections: Connections,
}

/// Search parameters extracted from a spoken command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VoiceCommandResult {
    pub prospect_type: ProspectType,
    pub segment: String,
    pub city: String,
    /// Two-letter state code
    pub state: String,
}

/// Follow-up suggestions for a lead already in the funnel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LeadSuggestions {
    pub next_action: String,
    pub whatsapp_message: String,
    /// Set when the last interaction is stale
    #[serde(default)]
    pub alert: Option<String>,
    pub approach_title: String,
    #[serde(default)]
    pub low_data_tips: Vec<String>,
}

/// Leads for finding contact data the lead is missing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AdditionalData {
    #[serde(default)]
    pub suggested_phone: Option<String>,
    pub name_variations: Vec<String>,
    #[serde(default)]
    pub alternative_address: Option<String>,
    pub google_maps_search: String,
    #[serde(default)]
    pub association_suggestion: Option<String>,
    pub suggested_search_terms: Vec<String>,
}
