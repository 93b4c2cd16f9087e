//! Configuration loading for the Leads Hunter service.
//!
//! Loads layered `.env` files and environment variables prefixed with
//! `LEADSHUNTER_`, producing a typed [`AppConfig`].

use std::{collections::BTreeMap, env, net::SocketAddr, path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const ENV_PREFIX: &str = "LEADSHUNTER_";

/// Application configuration derived from `LEADSHUNTER_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AppConfig {
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default = "default_api_bind_addr")]
    pub api_bind_addr: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    #[serde(default = "default_db_acquire_timeout_ms")]
    pub db_acquire_timeout_ms: u64,
    /// Origins allowed by CORS; empty allows any origin
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cors_allowed_origins: Vec<String>,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub billing: BillingConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

/// Session liveness settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct SessionConfig {
    /// Heartbeat period; also the longest a preempted session stays usable
    #[serde(default = "default_session_heartbeat_interval_seconds")]
    pub heartbeat_interval_seconds: u64,
}

impl SessionConfig {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_seconds)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.heartbeat_interval_seconds == 0 || self.heartbeat_interval_seconds > 300 {
            return Err(ConfigError::InvalidHeartbeatInterval {
                value: self.heartbeat_interval_seconds,
            });
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_seconds: default_session_heartbeat_interval_seconds(),
        }
    }
}

/// Subscription pricing and cycle length applied to new companies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct BillingConfig {
    #[serde(default = "default_billing_cycle_days")]
    pub cycle_days: i64,
    /// Monthly base price, covers the owner seat
    #[serde(default = "default_billing_base_price")]
    pub base_price: f64,
    /// Price per billable member
    #[serde(default = "default_billing_user_price")]
    pub user_price: f64,
}

impl BillingConfig {
    pub fn cycle_length(&self) -> chrono::Duration {
        chrono::Duration::days(self.cycle_days)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cycle_days <= 0 || self.cycle_days > 366 {
            return Err(ConfigError::InvalidBillingCycle {
                value: self.cycle_days,
            });
        }
        for (field, value) in [("base price", self.base_price), ("user price", self.user_price)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidPrice {
                    field: field.to_string(),
                    value,
                });
            }
        }
        Ok(())
    }
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            cycle_days: default_billing_cycle_days(),
            base_price: default_billing_base_price(),
            user_price: default_billing_user_price(),
        }
    }
}

/// Generative language API used by the prospecting assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AssistantConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_assistant_api_base")]
    pub api_base: String,
    /// Model for search, scripts and enrichment
    #[serde(default = "default_assistant_model")]
    pub model: String,
    /// Model for deep lead analysis
    #[serde(default = "default_assistant_analysis_model")]
    pub analysis_model: String,
    #[serde(default = "default_assistant_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

impl AssistantConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if url::Url::parse(&self.api_base).is_err() {
            return Err(ConfigError::InvalidAssistantApiBase {
                value: self.api_base.clone(),
            });
        }
        if self.request_timeout_seconds == 0 {
            return Err(ConfigError::InvalidAssistantTimeout {
                value: self.request_timeout_seconds,
            });
        }
        Ok(())
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: default_assistant_api_base(),
            model: default_assistant_model(),
            analysis_model: default_assistant_analysis_model(),
            request_timeout_seconds: default_assistant_request_timeout_seconds(),
        }
    }
}

/// Platform admin account created by `seed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct BootstrapConfig {
    #[serde(default = "default_bootstrap_admin_email")]
    pub admin_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_secret: Option<String>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            admin_email: default_bootstrap_admin_email(),
            admin_secret: None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            api_bind_addr: default_api_bind_addr(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            database_url: default_database_url(),
            db_max_connections: default_db_max_connections(),
            db_acquire_timeout_ms: default_db_acquire_timeout_ms(),
            cors_allowed_origins: Vec::new(),
            session: SessionConfig::default(),
            billing: BillingConfig::default(),
            assistant: AssistantConfig::default(),
            bootstrap: BootstrapConfig::default(),
        }
    }
}

impl AppConfig {
    /// Returns the configured bind address as a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.api_bind_addr.parse()
    }

    /// Returns a redacted JSON representation (secrets are redacted).
    pub fn redacted_json(&self) -> serde_json::Result<String> {
        let mut config = self.clone();
        if config.assistant.api_key.is_some() {
            config.assistant.api_key = Some("[REDACTED]".to_string());
        }
        if config.bootstrap.admin_secret.is_some() {
            config.bootstrap.admin_secret = Some("[REDACTED]".to_string());
        }
        if let Ok(mut url) = url::Url::parse(&config.database_url)
            && url.password().is_some()
            && url.set_password(Some("REDACTED")).is_ok()
        {
            config.database_url = url.to_string();
        }
        serde_json::to_string_pretty(&config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::MissingDatabaseUrl);
        }

        if self.db_max_connections == 0 {
            return Err(ConfigError::InvalidDbMaxConnections {
                value: self.db_max_connections,
            });
        }

        if !matches!(self.log_format.as_str(), "json" | "pretty") {
            return Err(ConfigError::InvalidLogFormat {
                value: self.log_format.clone(),
            });
        }

        self.session.validate()?;
        self.billing.validate()?;
        self.assistant.validate()?;

        Ok(())
    }
}

fn default_profile() -> String {
    "local".to_string()
}

fn default_api_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_database_url() -> String {
    "sqlite://leadshunter.db?mode=rwc".to_string()
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_db_acquire_timeout_ms() -> u64 {
    5000
}

fn default_session_heartbeat_interval_seconds() -> u64 {
    15
}

fn default_billing_cycle_days() -> i64 {
    30
}

fn default_billing_base_price() -> f64 {
    50.0
}

fn default_billing_user_price() -> f64 {
    25.0
}

fn default_assistant_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_assistant_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_assistant_analysis_model() -> String {
    "gemini-3-pro-preview".to_string()
}

fn default_assistant_request_timeout_seconds() -> u64 {
    60
}

fn default_bootstrap_admin_email() -> String {
    "admin@leadshunter.com".to_string()
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load environment file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        source: dotenvy::Error,
    },
    #[error("invalid api bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("database url is missing; set LEADSHUNTER_DATABASE_URL")]
    MissingDatabaseUrl,
    #[error("database max connections must be at least 1, got {value}")]
    InvalidDbMaxConnections { value: u32 },
    #[error("log format must be 'json' or 'pretty', got '{value}'")]
    InvalidLogFormat { value: String },
    #[error("session heartbeat interval must be between 1 and 300 seconds, got {value}")]
    InvalidHeartbeatInterval { value: u64 },
    #[error("billing cycle must be between 1 and 366 days, got {value}")]
    InvalidBillingCycle { value: i64 },
    #[error("billing {field} must be a non-negative number, got {value}")]
    InvalidPrice { field: String, value: f64 },
    #[error("assistant api base '{value}' is not a valid url")]
    InvalidAssistantApiBase { value: String },
    #[error("assistant request timeout must be positive, got {value}")]
    InvalidAssistantTimeout { value: u64 },
}

/// Loads configuration using layered `.env` files and `LEADSHUNTER_*` env vars.
pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    /// Creates a new loader rooted at the current working directory.
    pub fn new() -> Self {
        Self {
            base_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Creates a loader rooted at the provided directory (useful for tests).
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Loads `.env`, `.env.local`, `.env.{profile}`, `.env.{profile}.local`,
    /// then the process environment, later layers winning.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let (mut layered, profile_hint) = self.collect_layered_env()?;

        // Overlay process environment last so it wins.
        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                layered.insert(stripped.to_string(), value);
            }
        }

        let profile = layered
            .remove("PROFILE")
            .filter(|v| !v.is_empty())
            .unwrap_or(profile_hint);
        let api_bind_addr = layered
            .remove("API_BIND_ADDR")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_api_bind_addr);
        let log_level = layered
            .remove("LOG_LEVEL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_log_level);
        let log_format = layered
            .remove("LOG_FORMAT")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_log_format);
        let database_url = layered
            .remove("DATABASE_URL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_database_url);
        let db_max_connections = layered
            .remove("DB_MAX_CONNECTIONS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_db_max_connections);
        let db_acquire_timeout_ms = layered
            .remove("DB_ACQUIRE_TIMEOUT_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_db_acquire_timeout_ms);
        let cors_allowed_origins = layered
            .remove("CORS_ALLOWED_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let session = SessionConfig {
            heartbeat_interval_seconds: layered
                .remove("SESSION_HEARTBEAT_INTERVAL_SECONDS")
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_session_heartbeat_interval_seconds),
        };

        let billing = BillingConfig {
            cycle_days: layered
                .remove("BILLING_CYCLE_DAYS")
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_billing_cycle_days),
            base_price: layered
                .remove("BILLING_BASE_PRICE")
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_billing_base_price),
            user_price: layered
                .remove("BILLING_USER_PRICE")
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_billing_user_price),
        };

        // The bare GEMINI_API_KEY is honoured for parity with other Gemini tooling.
        let api_key = layered
            .remove("ASSISTANT_API_KEY")
            .or_else(|| env::var("GEMINI_API_KEY").ok())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        let assistant = AssistantConfig {
            api_key,
            api_base: layered
                .remove("ASSISTANT_API_BASE")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(default_assistant_api_base),
            model: layered
                .remove("ASSISTANT_MODEL")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(default_assistant_model),
            analysis_model: layered
                .remove("ASSISTANT_ANALYSIS_MODEL")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(default_assistant_analysis_model),
            request_timeout_seconds: layered
                .remove("ASSISTANT_REQUEST_TIMEOUT_SECONDS")
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_assistant_request_timeout_seconds),
        };

        let bootstrap = BootstrapConfig {
            admin_email: layered
                .remove("BOOTSTRAP_ADMIN_EMAIL")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(default_bootstrap_admin_email),
            admin_secret: layered
                .remove("BOOTSTRAP_ADMIN_SECRET")
                .filter(|v| !v.is_empty()),
        };

        let config = AppConfig {
            profile,
            api_bind_addr,
            log_level,
            log_format,
            database_url,
            db_max_connections,
            db_acquire_timeout_ms,
            cors_allowed_origins,
            session,
            billing,
            assistant,
            bootstrap,
        };

        config.validate()?;

        match config.bind_addr() {
            Ok(_) => Ok(config),
            Err(source) => Err(ConfigError::InvalidBindAddr {
                value: config.api_bind_addr.clone(),
                source,
            }),
        }
    }

    fn collect_layered_env(&self) -> Result<(BTreeMap<String, String>, String), ConfigError> {
        let mut values = BTreeMap::new();

        self.merge_dotenv(self.base_dir.join(".env"), &mut values)?;
        self.merge_dotenv(self.base_dir.join(".env.local"), &mut values)?;

        let profile = env::var(format!("{ENV_PREFIX}PROFILE"))
            .ok()
            .or_else(|| values.get("PROFILE").cloned())
            .unwrap_or_else(default_profile);

        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}", &profile)),
            &mut values,
        )?;
        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}.local", &profile)),
            &mut values,
        )?;

        Ok((values, profile))
    }

    fn merge_dotenv(
        &self,
        path: PathBuf,
        values: &mut BTreeMap<String, String>,
    ) -> Result<(), ConfigError> {
        match dotenvy::from_path_iter(&path) {
            Ok(iter) => {
                for item in iter {
                    let (key, value) = item.map_err(|source| ConfigError::EnvFile {
                        path: path.clone(),
                        source,
                    })?;
                    if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                        values.insert(stripped.to_string(), value);
                    }
                }
                Ok(())
            }
            Err(dotenvy::Error::Io(ref io_err))
                if io_err.kind() == std::io::ErrorKind::NotFound =>
            {
                Ok(())
            }
            Err(err) => Err(ConfigError::EnvFile { path, source: err }),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
