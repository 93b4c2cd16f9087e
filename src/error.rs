//! # Error Handling
//!
//! This module provides unified error handling for the Leads Hunter API,
//! implementing a consistent problem+json response format with trace ID propagation.
//! Domain errors from the account engine, the funnel and the prospecting
//! assistant are mapped to HTTP statuses here so handlers can use `?` directly.

use axum::{
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::accounts::AccountError;
use crate::assistant::AssistantError;
use crate::funnel::FunnelError;
use crate::telemetry;

/// Unified API error response structure
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiError {
    /// HTTP status code for the response
    #[serde(skip_serializing, skip_deserializing)]
    pub status: StatusCode,
    /// Error code for programmatic handling
    pub code: Box<str>,
    /// Human-readable error message
    pub message: Box<str>,
    /// Additional error details (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Box<serde_json::Value>>,
    /// Suggested retry delay in seconds (optional)
    pub retry_after: Option<u64>,
    /// Correlation trace ID for debugging (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<Box<str>>,
}

impl ApiError {
    /// Create a new API error with the given status code and message
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into().into_boxed_str(),
            message: message.into().into_boxed_str(),
            details: None,
            retry_after: None,
            trace_id: Self::current_trace_id(),
        }
    }

    /// Add details to the error
    pub fn with_details<V: Into<serde_json::Value>>(mut self, details: V) -> Self {
        self.details = Some(Box::new(details.into()));
        self
    }

    /// Set retry after delay
    pub fn with_retry_after(mut self, seconds: u64) -> Self {
        self.retry_after = Some(seconds);
        self
    }

    /// Extract current trace ID from the active tracing span (falls back to generated correlation ID)
    fn current_trace_id() -> Option<Box<str>> {
        telemetry::current_trace_id()
            .map(|trace_id| trace_id.into_boxed_str())
            .or_else(|| {
                Some(format!("corr-{}", &uuid::Uuid::new_v4().to_string()[..8]).into_boxed_str())
            })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert(
            "content-type",
            HeaderValue::from_static("application/problem+json"),
        );

        if let Some(retry_after) = self.retry_after
            && let Ok(header_value) = HeaderValue::from_str(&retry_after.to_string())
        {
            headers.insert("retry-after", header_value);
        }

        (self.status, headers, axum::Json(self)).into_response()
    }
}

/// Errors raised by the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),
    #[error("{0} not found")]
    NotFound(String),
    #[error("invalid data: {0}")]
    Validation(String),
}

impl RepositoryError {
    /// Wrap a SeaORM error; usable directly in `map_err`.
    pub fn database_error(err: DbErr) -> Self {
        RepositoryError::Database(err)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        RepositoryError::Validation(message.into())
    }

    /// True when the underlying database rejected a write on a unique index.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            RepositoryError::Database(err) => is_unique_violation(err),
            _ => false,
        }
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        tracing::error!("Internal error: {:?}", error);

        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_SERVER_ERROR",
            "An internal error occurred",
        )
    }
}

impl From<DbErr> for ApiError {
    fn from(error: DbErr) -> Self {
        if is_unique_violation(&error) {
            tracing::debug!(?error, "Unique constraint violation detected");
            return Self::new(StatusCode::CONFLICT, "CONFLICT", "Resource already exists");
        }

        match error {
            DbErr::RecordNotFound(record) => Self::new(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                &format!("Record not found: {}", record),
            ),
            DbErr::Conn(connection_err) => {
                tracing::error!("Database connection error: {:?}", connection_err);
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    "Database service unavailable",
                )
            }
            _ => {
                tracing::error!("Database error: {:?}", error);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    "Database error occurred",
                )
            }
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Database(err) => err.into(),
            RepositoryError::NotFound(what) => Self::new(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                &format!("{} not found", what),
            ),
            RepositoryError::Validation(message) => {
                Self::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", &message)
            }
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(error: AccountError) -> Self {
        let message = error.to_string();
        let (status, code) = match error {
            AccountError::Repository(inner) => return inner.into(),
            AccountError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            AccountError::UserDeactivated => (StatusCode::FORBIDDEN, "USER_DEACTIVATED"),
            AccountError::CompanyUnlinked => (StatusCode::FORBIDDEN, "COMPANY_UNLINKED"),
            AccountError::CompanyPendingApproval => {
                (StatusCode::FORBIDDEN, "COMPANY_PENDING_APPROVAL")
            }
            AccountError::CompanyBlocked => (StatusCode::FORBIDDEN, "COMPANY_BLOCKED"),
            AccountError::EmailAlreadyInUse => (StatusCode::CONFLICT, "EMAIL_IN_USE"),
            AccountError::UserNotFound(_) | AccountError::CompanyNotFound(_) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND")
            }
            AccountError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
        };

        Self::new(status, code, message.as_str())
    }
}

impl From<FunnelError> for ApiError {
    fn from(error: FunnelError) -> Self {
        match error {
            FunnelError::LeadNotFound(id) => Self::new(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                &format!("Lead {} not found", id),
            ),
            FunnelError::Validation(message) => {
                Self::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", &message)
            }
            FunnelError::Repository(inner) => inner.into(),
        }
    }
}

const ANALYSIS_RETRY_AFTER_SECS: u64 = 30;

impl From<AssistantError> for ApiError {
    fn from(error: AssistantError) -> Self {
        tracing::warn!(error = %error, "Prospecting assistant call failed");
        Self::new(
            StatusCode::BAD_GATEWAY,
            "ANALYSIS_UNAVAILABLE",
            &error.to_string(),
        )
        .with_retry_after(ANALYSIS_RETRY_AFTER_SECS)
    }
}

/// Create an unauthorized error (401)
pub fn unauthorized(message: Option<&str>) -> ApiError {
    let msg = message.unwrap_or("Authentication required");
    ApiError::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg)
}

/// The held session is no longer the user's live session (401)
pub fn session_invalidated() -> ApiError {
    ApiError::new(
        StatusCode::UNAUTHORIZED,
        "SESSION_INVALIDATED",
        "Your session has ended. Please sign in again",
    )
}

/// Create a forbidden error (403)
pub fn forbidden(message: Option<&str>) -> ApiError {
    let msg = message.unwrap_or("Insufficient permissions");
    ApiError::new(StatusCode::FORBIDDEN, "FORBIDDEN", msg)
}

/// Create a validation error with field details
pub fn validation_error(message: &str, field_errors: serde_json::Value) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", message).with_details(field_errors)
}
