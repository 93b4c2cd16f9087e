//! # Auth API Handlers
//!
//! Company sign-up, login with single-session preemption, heartbeat, logout
//! and the caller's own account.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::types::{ApiResponse, client_info};
use crate::accounts::{AccountSnapshot, LoginOutcome, RegistrationOutcome, RegistrationRequest};
use crate::auth::SessionUser;
use crate::error::{ApiError, session_invalidated};
use crate::server::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "owner@padaria.com.br")]
    pub email: String,
    pub secret: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HeartbeatResponse {
    /// Always true; a stale session is answered with 401 instead
    pub alive: bool,
    /// Seconds until the next heartbeat is due
    pub interval_seconds: u64,
}

/// Register a company and its owner
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegistrationRequest,
    responses(
        (status = 201, description = "Company registered and awaiting approval", body = ApiResponse<RegistrationOutcome>),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 409, description = "Email already in use", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegistrationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RegistrationOutcome>>), ApiError> {
    let outcome = state.accounts.register_company_request(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(outcome))))
}

/// Log in, replacing any other live session of the user
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = ApiResponse<LoginOutcome>),
        (status = 401, description = "Invalid credentials", body = ApiError),
        (status = 403, description = "User deactivated or company unavailable", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginOutcome>>, ApiError> {
    let outcome = state
        .accounts
        .login(&request.email, &request.secret, client_info(&headers))
        .await?;
    Ok(Json(ApiResponse::new(outcome)))
}

/// Stamp liveness for the caller's session
#[utoipa::path(
    post,
    path = "/api/v1/auth/heartbeat",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Session alive", body = ApiResponse<HeartbeatResponse>),
        (status = 401, description = "Session invalidated", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn heartbeat(
    State(state): State<AppState>,
    session: SessionUser,
) -> Result<Json<ApiResponse<HeartbeatResponse>>, ApiError> {
    let alive = state
        .accounts
        .heartbeat(session.user_id(), session.session_id())
        .await?;
    if !alive {
        return Err(session_invalidated());
    }

    Ok(Json(ApiResponse::new(HeartbeatResponse {
        alive,
        interval_seconds: state.config.session.heartbeat_interval_seconds,
    })))
}

/// End the caller's session
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Logged out"),
        (status = 401, description = "Session invalidated", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn logout(
    State(state): State<AppState>,
    session: SessionUser,
) -> Result<StatusCode, ApiError> {
    state.accounts.logout(session.user_id()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// The caller's profile, company and recent logins
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current account", body = ApiResponse<AccountSnapshot>),
        (status = 401, description = "Session invalidated", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn me(
    State(state): State<AppState>,
    session: SessionUser,
) -> Result<Json<ApiResponse<AccountSnapshot>>, ApiError> {
    let snapshot = state.accounts.account_snapshot(session.user_id()).await?;
    Ok(Json(ApiResponse::new(snapshot)))
}
