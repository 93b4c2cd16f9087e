//! # Data Models
//!
//! This module contains the SeaORM entities persisted by the service.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod access_log;
pub mod company;
pub mod lead;
pub mod user;

pub use access_log::Entity as AccessLog;
pub use company::Entity as Company;
pub use lead::Entity as Lead;
pub use user::Entity as User;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "leadshunter".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
