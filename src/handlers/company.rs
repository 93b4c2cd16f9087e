//! # Company API Handlers
//!
//! Owner-facing member management and the current invoice.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use super::types::ApiResponse;
use crate::accounts::{BillingSummary, NewMember, UserProfile};
use crate::auth::SessionUser;
use crate::error::{ApiError, forbidden};
use crate::models::user::UserRole;
use crate::server::AppState;

/// Members of the owner's company
#[utoipa::path(
    get,
    path = "/api/v1/company/users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Company members", body = ApiResponse<Vec<UserProfile>>),
        (status = 401, description = "Session invalidated", body = ApiError),
        (status = 403, description = "Not a company owner", body = ApiError)
    ),
    tag = "company"
)]
pub async fn list_users(
    State(state): State<AppState>,
    session: SessionUser,
) -> Result<Json<ApiResponse<Vec<UserProfile>>>, ApiError> {
    let company_id = session.require_owner()?;
    let users = state.accounts.owner_list_users(company_id).await?;
    Ok(Json(ApiResponse::new(users)))
}

/// Add a billable member to the owner's company
#[utoipa::path(
    post,
    path = "/api/v1/company/users",
    security(("bearer_auth" = [])),
    request_body = NewMember,
    responses(
        (status = 201, description = "Member created", body = ApiResponse<UserProfile>),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 403, description = "Not a company owner", body = ApiError),
        (status = 409, description = "Email already in use", body = ApiError)
    ),
    tag = "company"
)]
pub async fn create_user(
    State(state): State<AppState>,
    session: SessionUser,
    Json(member): Json<NewMember>,
) -> Result<(StatusCode, Json<ApiResponse<UserProfile>>), ApiError> {
    let company_id = session.require_owner()?;
    let user = state.accounts.owner_create_user(company_id, member).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(user))))
}

/// Flip a member between active and inactive
#[utoipa::path(
    post,
    path = "/api/v1/company/users/{id}/toggle",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Member status toggled", body = ApiResponse<UserProfile>),
        (status = 403, description = "Target is not a member of the company", body = ApiError),
        (status = 404, description = "User not found", body = ApiError)
    ),
    tag = "company"
)]
pub async fn toggle_user(
    State(state): State<AppState>,
    session: SessionUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    if !session.is_admin() {
        let company_id = session.require_owner()?;
        let target = state.accounts.user_profile(user_id).await?;
        if target.company_id != Some(company_id) {
            return Err(forbidden(Some("User belongs to another company")));
        }
        if target.role != UserRole::User {
            return Err(forbidden(Some("Only members can be activated or deactivated")));
        }
    }

    let user = state.accounts.owner_toggle_user_status(user_id).await?;
    Ok(Json(ApiResponse::new(user)))
}

/// Invoice for the owner's current billing cycle
#[utoipa::path(
    get,
    path = "/api/v1/company/billing",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current invoice", body = ApiResponse<BillingSummary>),
        (status = 403, description = "Not a company owner", body = ApiError)
    ),
    tag = "company"
)]
pub async fn billing(
    State(state): State<AppState>,
    session: SessionUser,
) -> Result<Json<ApiResponse<BillingSummary>>, ApiError> {
    let company_id = session.require_owner()?;
    let summary = state.accounts.billing_summary(company_id).await?;
    Ok(Json(ApiResponse::new(summary)))
}
