//! # Admin API Handlers
//!
//! Platform admin views over every company, user and login, plus company
//! status changes and manual cycle closing.

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::types::ApiResponse;
use crate::accounts::{AccessFeedEntry, BillingSummary, CompanyProfile, RevenueOverview, UserProfile};
use crate::auth::SessionUser;
use crate::error::ApiError;
use crate::models::company::CompanyStatus;
use crate::server::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CompanyStatusRequest {
    pub status: CompanyStatus,
}

/// Every company on the platform
#[utoipa::path(
    get,
    path = "/api/v1/admin/companies",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Companies", body = ApiResponse<Vec<CompanyProfile>>),
        (status = 403, description = "Not the platform admin", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn list_companies(
    State(state): State<AppState>,
    session: SessionUser,
) -> Result<Json<ApiResponse<Vec<CompanyProfile>>>, ApiError> {
    session.require_admin()?;
    let companies = state.accounts.master_list_companies().await?;
    Ok(Json(ApiResponse::new(companies)))
}

/// Every user on the platform
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Users", body = ApiResponse<Vec<UserProfile>>),
        (status = 403, description = "Not the platform admin", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn list_users(
    State(state): State<AppState>,
    session: SessionUser,
) -> Result<Json<ApiResponse<Vec<UserProfile>>>, ApiError> {
    session.require_admin()?;
    let users = state.accounts.master_list_users().await?;
    Ok(Json(ApiResponse::new(users)))
}

/// Platform-wide login feed, newest first
#[utoipa::path(
    get,
    path = "/api/v1/admin/access-logs",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Access feed", body = ApiResponse<Vec<AccessFeedEntry>>),
        (status = 403, description = "Not the platform admin", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn access_logs(
    State(state): State<AppState>,
    session: SessionUser,
) -> Result<Json<ApiResponse<Vec<AccessFeedEntry>>>, ApiError> {
    session.require_admin()?;
    let feed = state.accounts.master_access_feed().await?;
    Ok(Json(ApiResponse::new(feed)))
}

/// Revenue across every company
#[utoipa::path(
    get,
    path = "/api/v1/admin/revenue",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Revenue overview", body = ApiResponse<RevenueOverview>),
        (status = 403, description = "Not the platform admin", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn revenue(
    State(state): State<AppState>,
    session: SessionUser,
) -> Result<Json<ApiResponse<RevenueOverview>>, ApiError> {
    session.require_admin()?;
    let overview = state.accounts.revenue_overview().await?;
    Ok(Json(ApiResponse::new(overview)))
}

/// Set a company's status
#[utoipa::path(
    put,
    path = "/api/v1/admin/companies/{id}/status",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Company identifier")),
    request_body = CompanyStatusRequest,
    responses(
        (status = 200, description = "Company updated", body = ApiResponse<CompanyProfile>),
        (status = 403, description = "Not the platform admin", body = ApiError),
        (status = 404, description = "Company not found", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn update_company_status(
    State(state): State<AppState>,
    session: SessionUser,
    Path(company_id): Path<Uuid>,
    Json(request): Json<CompanyStatusRequest>,
) -> Result<Json<ApiResponse<CompanyProfile>>, ApiError> {
    session.require_admin()?;
    let company = state
        .accounts
        .master_update_company_status(company_id, request.status)
        .await?;
    Ok(Json(ApiResponse::new(company)))
}

/// Close the company's billing cycle now
#[utoipa::path(
    post,
    path = "/api/v1/admin/companies/{id}/close-cycle",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Company identifier")),
    responses(
        (status = 200, description = "Cycle closed", body = ApiResponse<CompanyProfile>),
        (status = 403, description = "Not the platform admin", body = ApiError),
        (status = 404, description = "Company not found", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn close_cycle(
    State(state): State<AppState>,
    session: SessionUser,
    Path(company_id): Path<Uuid>,
) -> Result<Json<ApiResponse<CompanyProfile>>, ApiError> {
    session.require_admin()?;
    let company = state.accounts.master_close_cycle_manually(company_id).await?;
    Ok(Json(ApiResponse::new(company)))
}

/// Invoice for any company's current cycle
#[utoipa::path(
    get,
    path = "/api/v1/admin/companies/{id}/billing",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Company identifier")),
    responses(
        (status = 200, description = "Current invoice", body = ApiResponse<BillingSummary>),
        (status = 403, description = "Not the platform admin", body = ApiError),
        (status = 404, description = "Company not found", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn company_billing(
    State(state): State<AppState>,
    session: SessionUser,
    Path(company_id): Path<Uuid>,
) -> Result<Json<ApiResponse<BillingSummary>>, ApiError> {
    session.require_admin()?;
    let summary = state.accounts.billing_summary(company_id).await?;
    Ok(Json(ApiResponse::new(summary)))
}
