//! # Leads API Handlers
//!
//! Funnel operations scoped to the caller's company. The platform admin sees
//! every lead.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::types::ApiResponse;
use crate::assistant::PotentialLead;
use crate::auth::SessionUser;
use crate::error::ApiError;
use crate::funnel::{LeadBoard, LeadOwner, LeadRecord, LeadUpdate, ManualLead};
use crate::models::lead::{FunnelStatus, ProspectType};
use crate::server::AppState;

/// A discovered prospect to move into the funnel
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProspectCapture {
    pub prospect: PotentialLead,
    #[serde(default)]
    pub prospect_type: ProspectType,
    /// Search location; it replaces the prospect's own city and state
    pub city: String,
    pub state: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum NewLeadRequest {
    Manual(ManualLead),
    Prospect(ProspectCapture),
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusChangeRequest {
    pub status: FunnelStatus,
}

fn owner(session: &SessionUser) -> LeadOwner {
    LeadOwner {
        company_id: session.company_id(),
        user_id: Some(session.user_id()),
    }
}

/// Leads visible to the caller, newest first
#[utoipa::path(
    get,
    path = "/api/v1/leads",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Leads", body = ApiResponse<Vec<LeadRecord>>),
        (status = 401, description = "Session invalidated", body = ApiError)
    ),
    tag = "leads"
)]
pub async fn list_leads(
    State(state): State<AppState>,
    session: SessionUser,
) -> Result<Json<ApiResponse<Vec<LeadRecord>>>, ApiError> {
    let leads = state.funnel.list(session.lead_scope()).await?;
    Ok(Json(ApiResponse::new(leads)))
}

/// Add a lead, typed in by hand or captured from prospect discovery
#[utoipa::path(
    post,
    path = "/api/v1/leads",
    security(("bearer_auth" = [])),
    request_body = NewLeadRequest,
    responses(
        (status = 201, description = "Lead created", body = ApiResponse<LeadRecord>),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Session invalidated", body = ApiError)
    ),
    tag = "leads"
)]
pub async fn create_lead(
    State(state): State<AppState>,
    session: SessionUser,
    Json(request): Json<NewLeadRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LeadRecord>>), ApiError> {
    let owner = owner(&session);
    let lead = match request {
        NewLeadRequest::Manual(manual) => state.funnel.add_manual_lead(manual, owner).await?,
        NewLeadRequest::Prospect(capture) => {
            state
                .funnel
                .add_prospect(
                    capture.prospect,
                    capture.prospect_type,
                    &capture.city,
                    &capture.state,
                    owner,
                )
                .await?
        }
    };
    Ok((StatusCode::CREATED, Json(ApiResponse::new(lead))))
}

/// Leads grouped by funnel stage
#[utoipa::path(
    get,
    path = "/api/v1/leads/board",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Funnel board", body = ApiResponse<LeadBoard>),
        (status = 401, description = "Session invalidated", body = ApiError)
    ),
    tag = "leads"
)]
pub async fn board(
    State(state): State<AppState>,
    session: SessionUser,
) -> Result<Json<ApiResponse<LeadBoard>>, ApiError> {
    let board = state.funnel.board(session.lead_scope()).await?;
    Ok(Json(ApiResponse::new(board)))
}

#[utoipa::path(
    get,
    path = "/api/v1/leads/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Lead identifier")),
    responses(
        (status = 200, description = "Lead", body = ApiResponse<LeadRecord>),
        (status = 404, description = "Lead not found", body = ApiError)
    ),
    tag = "leads"
)]
pub async fn get_lead(
    State(state): State<AppState>,
    session: SessionUser,
    Path(lead_id): Path<Uuid>,
) -> Result<Json<ApiResponse<LeadRecord>>, ApiError> {
    let lead = state.funnel.get(lead_id, session.lead_scope()).await?;
    Ok(Json(ApiResponse::new(lead)))
}

/// Replace a lead's editable fields
#[utoipa::path(
    put,
    path = "/api/v1/leads/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Lead identifier")),
    request_body = LeadUpdate,
    responses(
        (status = 200, description = "Lead updated", body = ApiResponse<LeadRecord>),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 404, description = "Lead not found", body = ApiError)
    ),
    tag = "leads"
)]
pub async fn update_lead(
    State(state): State<AppState>,
    session: SessionUser,
    Path(lead_id): Path<Uuid>,
    Json(update): Json<LeadUpdate>,
) -> Result<Json<ApiResponse<LeadRecord>>, ApiError> {
    let lead = state
        .funnel
        .update_lead(lead_id, update, session.lead_scope())
        .await?;
    Ok(Json(ApiResponse::new(lead)))
}

/// Move a lead to another funnel stage
#[utoipa::path(
    put,
    path = "/api/v1/leads/{id}/status",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Lead identifier")),
    request_body = StatusChangeRequest,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<LeadRecord>),
        (status = 404, description = "Lead not found", body = ApiError)
    ),
    tag = "leads"
)]
pub async fn update_status(
    State(state): State<AppState>,
    session: SessionUser,
    Path(lead_id): Path<Uuid>,
    Json(request): Json<StatusChangeRequest>,
) -> Result<Json<ApiResponse<LeadRecord>>, ApiError> {
    let lead = state
        .funnel
        .update_status(lead_id, request.status, session.lead_scope())
        .await?;
    Ok(Json(ApiResponse::new(lead)))
}
