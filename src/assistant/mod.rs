//! # Prospecting Assistant
//!
//! Generative-model collaborator for prospect discovery, outreach scripts,
//! lead analysis and enrichment. Callers depend on [`ProspectingAssistant`];
//! [`GeminiAssistant`] is the production implementation.

pub mod catalog;
mod gemini;
pub mod prompts;
mod types;

pub use catalog::{Catalog, OTHER_SEGMENT};
pub use gemini::GeminiAssistant;
pub use types::{
    AdditionalData, AnalysisScripts, CommercialAnalysis, Connections, Decisor, LeadAnalysis,
    LeadSuggestions, ObjectionHandling, PotentialLead, ProspectQuery, ProspectSearchResult,
    Scripts, TechnicalAnalysis, VoiceCommandResult,
};

use async_trait::async_trait;
use thiserror::Error;

use crate::funnel::LeadRecord;

/// Any transport, status or decoding failure of the model call.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("The {operation} is unavailable right now. Please try again later")]
    AnalysisUnavailable { operation: &'static str },
}

impl AssistantError {
    pub fn unavailable(operation: &'static str) -> Self {
        Self::AnalysisUnavailable { operation }
    }
}

#[async_trait]
pub trait ProspectingAssistant: Send + Sync {
    async fn find_prospects(
        &self,
        query: &ProspectQuery,
    ) -> Result<ProspectSearchResult, AssistantError>;

    async fn generate_scripts(&self, lead: &PotentialLead) -> Result<Scripts, AssistantError>;

    async fn analyze_lead(&self, lead: &PotentialLead) -> Result<LeadAnalysis, AssistantError>;

    async fn interpret_voice_command(
        &self,
        text: &str,
    ) -> Result<VoiceCommandResult, AssistantError>;

    /// Niche suggestions for a segment. Never fails; an empty list means
    /// none could be produced.
    async fn niches_for_segment(&self, segment: &str, custom: Option<&str>) -> Vec<String>;

    async fn lead_suggestions(&self, lead: &LeadRecord) -> Result<LeadSuggestions, AssistantError>;

    async fn find_additional_data(
        &self,
        lead: &LeadRecord,
    ) -> Result<AdditionalData, AssistantError>;
}

/// The segment niches should be generated for, if any.
pub fn niche_subject<'a>(segment: &'a str, custom: Option<&'a str>) -> Option<&'a str> {
    if segment == OTHER_SEGMENT {
        return types::custom_segment(segment, custom);
    }
    let segment = segment.trim();
    (!segment.is_empty()).then_some(segment)
}
