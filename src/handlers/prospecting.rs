//! # Prospecting API Handlers
//!
//! Thin wrappers over the prospecting assistant. Assistant failures surface
//! as 502 `ANALYSIS_UNAVAILABLE`.

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::types::ApiResponse;
use crate::assistant::{
    AdditionalData, Catalog, LeadAnalysis, LeadSuggestions, PotentialLead, ProspectQuery,
    ProspectSearchResult, Scripts, VoiceCommandResult, catalog,
};
use crate::auth::SessionUser;
use crate::error::{ApiError, validation_error};
use crate::server::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VoiceCommandRequest {
    #[schema(example = "Buscar padarias em Curitiba no Paraná")]
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NicheRequest {
    pub segment: String,
    #[serde(default)]
    pub custom_segment: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NicheList {
    pub niches: Vec<String>,
}

/// Segments and search radii offered to users
#[utoipa::path(
    get,
    path = "/api/v1/prospecting/catalog",
    responses(
        (status = 200, description = "Prospecting catalog", body = ApiResponse<Catalog>)
    ),
    tag = "prospecting"
)]
pub async fn get_catalog() -> Json<ApiResponse<Catalog>> {
    Json(ApiResponse::new(catalog::catalog()))
}

/// Discover companies matching the search criteria
#[utoipa::path(
    post,
    path = "/api/v1/prospecting/search",
    security(("bearer_auth" = [])),
    request_body = ProspectQuery,
    responses(
        (status = 200, description = "One page of prospects", body = ApiResponse<ProspectSearchResult>),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 502, description = "Assistant unavailable", body = ApiError)
    ),
    tag = "prospecting"
)]
pub async fn search(
    State(state): State<AppState>,
    _session: SessionUser,
    Json(query): Json<ProspectQuery>,
) -> Result<Json<ApiResponse<ProspectSearchResult>>, ApiError> {
    if query.city.trim().is_empty() || query.state.trim().is_empty() {
        return Err(validation_error(
            "Search location is required",
            serde_json::json!({ "city": "required", "state": "required" }),
        ));
    }
    if query.limit == 0 {
        return Err(validation_error(
            "Page size must be positive",
            serde_json::json!({ "limit": "must be at least 1" }),
        ));
    }

    let result = state.assistant.find_prospects(&query).await?;
    Ok(Json(ApiResponse::new(result)))
}

/// Outreach scripts for a prospect
#[utoipa::path(
    post,
    path = "/api/v1/prospecting/scripts",
    security(("bearer_auth" = [])),
    request_body = PotentialLead,
    responses(
        (status = 200, description = "Scripts", body = ApiResponse<Scripts>),
        (status = 502, description = "Assistant unavailable", body = ApiError)
    ),
    tag = "prospecting"
)]
pub async fn scripts(
    State(state): State<AppState>,
    _session: SessionUser,
    Json(lead): Json<PotentialLead>,
) -> Result<Json<ApiResponse<Scripts>>, ApiError> {
    let scripts = state.assistant.generate_scripts(&lead).await?;
    Ok(Json(ApiResponse::new(scripts)))
}

/// Deep analysis of a prospect
#[utoipa::path(
    post,
    path = "/api/v1/prospecting/analysis",
    security(("bearer_auth" = [])),
    request_body = PotentialLead,
    responses(
        (status = 200, description = "Analysis", body = ApiResponse<LeadAnalysis>),
        (status = 502, description = "Assistant unavailable", body = ApiError)
    ),
    tag = "prospecting"
)]
pub async fn analysis(
    State(state): State<AppState>,
    _session: SessionUser,
    Json(lead): Json<PotentialLead>,
) -> Result<Json<ApiResponse<LeadAnalysis>>, ApiError> {
    let analysis = state.assistant.analyze_lead(&lead).await?;
    Ok(Json(ApiResponse::new(analysis)))
}

/// Search parameters from a spoken command
#[utoipa::path(
    post,
    path = "/api/v1/prospecting/voice",
    security(("bearer_auth" = [])),
    request_body = VoiceCommandRequest,
    responses(
        (status = 200, description = "Interpreted command", body = ApiResponse<VoiceCommandResult>),
        (status = 400, description = "Empty command", body = ApiError),
        (status = 502, description = "Assistant unavailable", body = ApiError)
    ),
    tag = "prospecting"
)]
pub async fn voice(
    State(state): State<AppState>,
    _session: SessionUser,
    Json(request): Json<VoiceCommandRequest>,
) -> Result<Json<ApiResponse<VoiceCommandResult>>, ApiError> {
    if request.text.trim().is_empty() {
        return Err(validation_error(
            "Command text is required",
            serde_json::json!({ "text": "required" }),
        ));
    }

    let result = state.assistant.interpret_voice_command(&request.text).await?;
    Ok(Json(ApiResponse::new(result)))
}

/// Niche suggestions for a segment; empty when none could be produced
#[utoipa::path(
    post,
    path = "/api/v1/prospecting/niches",
    security(("bearer_auth" = [])),
    request_body = NicheRequest,
    responses(
        (status = 200, description = "Niches", body = ApiResponse<NicheList>)
    ),
    tag = "prospecting"
)]
pub async fn niches(
    State(state): State<AppState>,
    _session: SessionUser,
    Json(request): Json<NicheRequest>,
) -> Json<ApiResponse<NicheList>> {
    let niches = state
        .assistant
        .niches_for_segment(&request.segment, request.custom_segment.as_deref())
        .await;
    Json(ApiResponse::new(NicheList { niches }))
}

/// Next-step suggestions for a lead in the funnel
#[utoipa::path(
    post,
    path = "/api/v1/prospecting/leads/{id}/suggestions",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Lead identifier")),
    responses(
        (status = 200, description = "Suggestions", body = ApiResponse<LeadSuggestions>),
        (status = 404, description = "Lead not found", body = ApiError),
        (status = 502, description = "Assistant unavailable", body = ApiError)
    ),
    tag = "prospecting"
)]
pub async fn lead_suggestions(
    State(state): State<AppState>,
    session: SessionUser,
    Path(lead_id): Path<Uuid>,
) -> Result<Json<ApiResponse<LeadSuggestions>>, ApiError> {
    let lead = state.funnel.get(lead_id, session.lead_scope()).await?;
    let suggestions = state.assistant.lead_suggestions(&lead).await?;
    Ok(Json(ApiResponse::new(suggestions)))
}

/// Hints for contact data a lead is missing
#[utoipa::path(
    post,
    path = "/api/v1/prospecting/leads/{id}/enrichment",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Lead identifier")),
    responses(
        (status = 200, description = "Additional data", body = ApiResponse<AdditionalData>),
        (status = 404, description = "Lead not found", body = ApiError),
        (status = 502, description = "Assistant unavailable", body = ApiError)
    ),
    tag = "prospecting"
)]
pub async fn lead_enrichment(
    State(state): State<AppState>,
    session: SessionUser,
    Path(lead_id): Path<Uuid>,
) -> Result<Json<ApiResponse<AdditionalData>>, ApiError> {
    let lead = state.funnel.get(lead_id, session.lead_scope()).await?;
    let data = state.assistant.find_additional_data(&lead).await?;
    Ok(Json(ApiResponse::new(data)))
}
