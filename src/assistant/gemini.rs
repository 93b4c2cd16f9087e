//! Gemini `generateContent` client
//!
//! Every call asks for a JSON answer constrained by a response schema and
//! decodes the first candidate's text into the operation's result type.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::{
    AdditionalData, AssistantError, LeadAnalysis, LeadSuggestions, PotentialLead,
    ProspectQuery, ProspectSearchResult, ProspectingAssistant, Scripts, VoiceCommandResult,
    niche_subject, prompts,
};
use crate::config::AssistantConfig;
use crate::funnel::LeadRecord;

#[derive(Debug, Clone)]
pub struct GeminiAssistant {
    client: Client,
    api_base: String,
    api_key: Option<String>,
    model: String,
    analysis_model: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

#[derive(Debug, Deserialize)]
struct SearchAnswer {
    #[serde(default)]
    total_found: Option<u64>,
    #[serde(default)]
    prospects: Vec<PotentialLead>,
}

#[derive(Debug, Deserialize)]
struct NicheAnswer {
    #[serde(default)]
    niches: Vec<String>,
}

impl GeminiAssistant {
    pub fn new(config: &AssistantConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            analysis_model: config.analysis_model.clone(),
        })
    }

    async fn generate<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        model: &str,
        prompt: String,
        schema: Value,
    ) -> Result<T, AssistantError> {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!(operation, "Assistant API key is not configured");
            return Err(AssistantError::unavailable(operation));
        };

        let url = format!("{}/v1beta/models/{}:generateContent", self.api_base, model);
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema,
            }
        });

        debug!(operation, model, "Calling generateContent");
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(operation, error = %e, "Assistant request failed");
                AssistantError::unavailable(operation)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(operation, status = status.as_u16(), body = %body, "Assistant returned an error status");
            return Err(AssistantError::unavailable(operation));
        }

        let envelope: GenerateContentResponse = response.json().await.map_err(|e| {
            warn!(operation, error = %e, "Assistant response is not valid JSON");
            AssistantError::unavailable(operation)
        })?;

        let Some(text) = envelope.text() else {
            warn!(operation, "Assistant response has no candidate text");
            return Err(AssistantError::unavailable(operation));
        };

        serde_json::from_str(&text).map_err(|e| {
            warn!(operation, error = %e, "Assistant answer does not match the expected shape");
            AssistantError::unavailable(operation)
        })
    }
}

#[async_trait]
impl ProspectingAssistant for GeminiAssistant {
    async fn find_prospects(
        &self,
        query: &ProspectQuery,
    ) -> Result<ProspectSearchResult, AssistantError> {
        let answer: SearchAnswer = self
            .generate(
                "prospect search",
                &self.model,
                prompts::prospect_search(query),
                prompts::prospect_search_schema(),
            )
            .await?;

        let prospects: Vec<PotentialLead> = answer
            .prospects
            .into_iter()
            .map(|mut lead| {
                if lead.city.trim().is_empty() {
                    lead.city = query.city.clone();
                }
                if lead.state.trim().is_empty() {
                    lead.state = query.state.clone();
                }
                lead
            })
            .collect();

        let total = answer.total_found.unwrap_or(prospects.len() as u64);
        Ok(ProspectSearchResult { prospects, total })
    }

    async fn generate_scripts(&self, lead: &PotentialLead) -> Result<Scripts, AssistantError> {
        self.generate(
            "script generation",
            &self.model,
            prompts::scripts(lead),
            prompts::scripts_schema(),
        )
        .await
    }

    async fn analyze_lead(&self, lead: &PotentialLead) -> Result<LeadAnalysis, AssistantError> {
        self.generate(
            "lead analysis",
            &self.analysis_model,
            prompts::lead_analysis(lead),
            prompts::lead_analysis_schema(),
        )
        .await
    }

    async fn interpret_voice_command(
        &self,
        text: &str,
    ) -> Result<VoiceCommandResult, AssistantError> {
        self.generate(
            "voice command",
            &self.model,
            prompts::voice_command(text),
            prompts::voice_command_schema(),
        )
        .await
    }

    async fn niches_for_segment(&self, segment: &str, custom: Option<&str>) -> Vec<String> {
        let Some(subject) = niche_subject(segment, custom) else {
            return Vec::new();
        };

        match self
            .generate::<NicheAnswer>(
                "niche suggestion",
                &self.model,
                prompts::niches(subject),
                prompts::niches_schema(),
            )
            .await
        {
            Ok(answer) => answer.niches,
            Err(_) => Vec::new(),
        }
    }

    async fn lead_suggestions(&self, lead: &LeadRecord) -> Result<LeadSuggestions, AssistantError> {
        self.generate(
            "lead suggestion",
            &self.model,
            prompts::lead_suggestions(lead, Utc::now()),
            prompts::lead_suggestions_schema(),
        )
        .await
    }

    async fn find_additional_data(
        &self,
        lead: &LeadRecord,
    ) -> Result<AdditionalData, AssistantError> {
        self.generate(
            "lead enrichment",
            &self.model,
            prompts::additional_data(lead),
            prompts::additional_data_schema(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "{\"niches\":" }, { "text": "[\"a\"]}" }] } }]
        }))
        .unwrap();
        assert_eq!(response.text().as_deref(), Some("{\"niches\":[\"a\"]}"));
    }

    #[test]
    fn empty_candidates_have_no_text() {
        let response: GenerateContentResponse =
            serde_json::from_value(json!({ "candidates": [] })).unwrap();
        assert_eq!(response.text(), None);
    }
}
