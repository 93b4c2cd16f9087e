//! # Authentication and Authorization
//!
//! Session bearer authentication and role guards for protected API
//! endpoints. Every request re-validates its session against the store, so a
//! login elsewhere, a deactivation or a company block takes effect on the
//! next call.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use uuid::Uuid;

use crate::accounts::{AccountService, AuthenticatedSession, SessionCheck};
use crate::config::AppConfig;
use crate::error::{ApiError, forbidden, session_invalidated, unauthorized};
use crate::funnel::LeadScope;
use crate::models::user::UserRole;
use crate::server::AppState;

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.config)
    }
}

impl FromRef<AppState> for AccountService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.accounts.clone()
    }
}

/// The caller's live session, re-derived from the store
#[derive(Debug, Clone)]
pub struct SessionUser(pub AuthenticatedSession);

impl SessionUser {
    pub fn user_id(&self) -> Uuid {
        self.0.user.id
    }

    pub fn session_id(&self) -> &str {
        &self.0.session_id
    }

    pub fn role(&self) -> UserRole {
        self.0.user.role
    }

    pub fn company_id(&self) -> Option<Uuid> {
        self.0.user.company_id
    }

    pub fn is_admin(&self) -> bool {
        self.role() == UserRole::AdminMaster
    }

    /// Leads the caller may see: their company's, or every lead for the admin.
    pub fn lead_scope(&self) -> LeadScope {
        match self.company_id() {
            Some(company_id) if !self.is_admin() => LeadScope::Company(company_id),
            _ => LeadScope::All,
        }
    }

    /// The owner's company, or 403 for anyone else.
    pub fn require_owner(&self) -> Result<Uuid, ApiError> {
        match (self.role(), self.company_id()) {
            (UserRole::Owner, Some(company_id)) => Ok(company_id),
            _ => Err(forbidden(Some("Company owner access required"))),
        }
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(forbidden(Some("Platform admin access required")))
        }
    }
}

impl<S> FromRequestParts<S> for SessionUser
where
    AccountService: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?;
        let accounts = AccountService::from_ref(state);

        match accounts.authenticate_token(token).await? {
            SessionCheck::Valid(session) => Ok(SessionUser(session)),
            SessionCheck::Invalid(reason) => {
                tracing::info!(reason = %reason, "Rejected request with invalid session");
                Err(session_invalidated())
            }
        }
    }
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| unauthorized(Some("Missing Authorization header")))?
        .to_str()
        .map_err(|_| unauthorized(Some("Invalid Authorization header")))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| unauthorized(Some("Authorization header must use Bearer scheme")))
}
