//! # Common API Types
//!
//! Response envelope and request helpers shared across handlers.

use axum::http::{HeaderMap, header::USER_AGENT};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::accounts::ClientInfo;
use crate::telemetry;

/// Standard success envelope
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub data: T,
    pub meta: ResponseMeta,
}

/// Response metadata
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResponseMeta {
    /// Request identifier for tracing
    #[schema(example = "req-3f2a9c1e")]
    pub request_id: String,
    /// Response timestamp (ISO 8601)
    #[schema(example = "2024-01-15T10:30:00Z")]
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        let request_id = telemetry::current_trace_id()
            .unwrap_or_else(|| format!("req-{}", &uuid::Uuid::new_v4().simple().to_string()[..8]));

        Self {
            data,
            meta: ResponseMeta {
                request_id,
                timestamp: Utc::now().to_rfc3339(),
            },
        }
    }
}

/// Caller details recorded in the access log.
pub fn client_info(headers: &HeaderMap) -> ClientInfo {
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let ip = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|value| value.to_str().ok())
        })
        .unwrap_or("unknown")
        .to_string();

    ClientInfo { user_agent, ip }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn client_info_prefers_first_forwarded_address() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("Mozilla/5.0"));
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));

        let info = client_info(&headers);
        assert_eq!(info.user_agent, "Mozilla/5.0");
        assert_eq!(info.ip, "203.0.113.7");
    }

    #[test]
    fn client_info_defaults_to_unknown() {
        let info = client_info(&HeaderMap::new());
        assert_eq!(info.user_agent, "unknown");
        assert_eq!(info.ip, "unknown");
    }

    #[test]
    fn envelope_carries_request_id() {
        let response = ApiResponse::new(42);
        assert!(response.meta.request_id.starts_with("req-"));
        assert_eq!(response.data, 42);
    }
}
