//! # Server Configuration
//!
//! Router, shared state and OpenAPI document for the Leads Hunter API.

use std::sync::Arc;

use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
};
use sea_orm::DatabaseConnection;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::accounts::AccountService;
use crate::assistant::{GeminiAssistant, ProspectingAssistant};
use crate::config::AppConfig;
use crate::funnel::FunnelService;
use crate::handlers;
use crate::telemetry;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub accounts: AccountService,
    pub funnel: FunnelService,
    pub assistant: Arc<dyn ProspectingAssistant>,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        config: Arc<AppConfig>,
        assistant: Arc<dyn ProspectingAssistant>,
    ) -> Self {
        Self {
            accounts: AccountService::new(db.clone(), config.billing.clone()),
            funnel: FunnelService::new(db.clone()),
            db,
            config,
            assistant,
        }
    }
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    let api = Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/heartbeat", post(handlers::auth::heartbeat))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/me", get(handlers::auth::me))
        .route(
            "/company/users",
            get(handlers::company::list_users).post(handlers::company::create_user),
        )
        .route(
            "/company/users/{id}/toggle",
            post(handlers::company::toggle_user),
        )
        .route("/company/billing", get(handlers::company::billing))
        .route("/admin/companies", get(handlers::admin::list_companies))
        .route("/admin/users", get(handlers::admin::list_users))
        .route("/admin/access-logs", get(handlers::admin::access_logs))
        .route("/admin/revenue", get(handlers::admin::revenue))
        .route(
            "/admin/companies/{id}/status",
            put(handlers::admin::update_company_status),
        )
        .route(
            "/admin/companies/{id}/close-cycle",
            post(handlers::admin::close_cycle),
        )
        .route(
            "/admin/companies/{id}/billing",
            get(handlers::admin::company_billing),
        )
        .route(
            "/leads",
            get(handlers::leads::list_leads).post(handlers::leads::create_lead),
        )
        .route("/leads/board", get(handlers::leads::board))
        .route(
            "/leads/{id}",
            get(handlers::leads::get_lead).put(handlers::leads::update_lead),
        )
        .route("/leads/{id}/status", put(handlers::leads::update_status))
        .route(
            "/prospecting/catalog",
            get(handlers::prospecting::get_catalog),
        )
        .route("/prospecting/search", post(handlers::prospecting::search))
        .route("/prospecting/scripts", post(handlers::prospecting::scripts))
        .route(
            "/prospecting/analysis",
            post(handlers::prospecting::analysis),
        )
        .route("/prospecting/voice", post(handlers::prospecting::voice))
        .route("/prospecting/niches", post(handlers::prospecting::niches))
        .route(
            "/prospecting/leads/{id}/suggestions",
            post(handlers::prospecting::lead_suggestions),
        )
        .route(
            "/prospecting/leads/{id}/enrichment",
            post(handlers::prospecting::lead_enrichment),
        );

    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .nest("/api/v1", api)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(telemetry::trace_id_middleware))
        .layer(cors)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.cors_allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

/// Starts the server with the given configuration
pub async fn run_server(config: AppConfig, db: DatabaseConnection) -> anyhow::Result<()> {
    let config = Arc::new(config);
    let assistant = GeminiAssistant::new(&config.assistant)?;
    if config.assistant.api_key.is_none() {
        tracing::warn!("No assistant API key configured; prospecting calls will be unavailable");
    }

    let state = AppState::new(db, Arc::clone(&config), Arc::new(assistant));
    let app = create_app(state);

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, profile = %config.profile, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("Session id returned by login"))
                    .build(),
            ),
        );
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz,
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::heartbeat,
        crate::handlers::auth::logout,
        crate::handlers::auth::me,
        crate::handlers::company::list_users,
        crate::handlers::company::create_user,
        crate::handlers::company::toggle_user,
        crate::handlers::company::billing,
        crate::handlers::admin::list_companies,
        crate::handlers::admin::list_users,
        crate::handlers::admin::access_logs,
        crate::handlers::admin::revenue,
        crate::handlers::admin::update_company_status,
        crate::handlers::admin::close_cycle,
        crate::handlers::admin::company_billing,
        crate::handlers::leads::list_leads,
        crate::handlers::leads::create_lead,
        crate::handlers::leads::board,
        crate::handlers::leads::get_lead,
        crate::handlers::leads::update_lead,
        crate::handlers::leads::update_status,
        crate::handlers::prospecting::get_catalog,
        crate::handlers::prospecting::search,
        crate::handlers::prospecting::scripts,
        crate::handlers::prospecting::analysis,
        crate::handlers::prospecting::voice,
        crate::handlers::prospecting::niches,
        crate::handlers::prospecting::lead_suggestions,
        crate::handlers::prospecting::lead_enrichment,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::handlers::HealthStatus,
            crate::error::ApiError,
            crate::handlers::types::ResponseMeta,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::HeartbeatResponse,
            crate::handlers::admin::CompanyStatusRequest,
            crate::handlers::leads::NewLeadRequest,
            crate::handlers::leads::ProspectCapture,
            crate::handlers::leads::StatusChangeRequest,
            crate::handlers::prospecting::VoiceCommandRequest,
            crate::handlers::prospecting::NicheRequest,
            crate::handlers::prospecting::NicheList,
            crate::accounts::RegistrationRequest,
            crate::accounts::NewMember,
            crate::accounts::UserProfile,
            crate::accounts::CompanyProfile,
            crate::accounts::AccessLogEntry,
            crate::accounts::AccountSnapshot,
            crate::accounts::LoginOutcome,
            crate::accounts::RegistrationOutcome,
            crate::accounts::BillingSummary,
            crate::accounts::CompanyRevenue,
            crate::accounts::RevenueOverview,
            crate::accounts::AccessFeedEntry,
            crate::funnel::LeadRecord,
            crate::funnel::ManualLead,
            crate::funnel::LeadUpdate,
            crate::funnel::LeadBoard,
            crate::funnel::BoardColumn,
            crate::assistant::Catalog,
            crate::assistant::PotentialLead,
            crate::assistant::ProspectQuery,
            crate::assistant::ProspectSearchResult,
            crate::assistant::Scripts,
            crate::assistant::LeadAnalysis,
            crate::assistant::VoiceCommandResult,
            crate::assistant::LeadSuggestions,
            crate::assistant::AdditionalData,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "root", description = "Service metadata and health"),
        (name = "auth", description = "Registration, login and session liveness"),
        (name = "company", description = "Owner member management and billing"),
        (name = "admin", description = "Platform administration"),
        (name = "leads", description = "Sales funnel"),
        (name = "prospecting", description = "Assistant-backed prospect discovery"),
    ),
    info(
        title = "Leads Hunter API",
        description = "Multi-tenant lead prospecting with per-seat billing",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
