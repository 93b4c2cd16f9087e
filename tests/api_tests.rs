//! End-to-end HTTP tests driving the router with `oneshot`.

mod test_utils;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use leadshunter::accounts::AccountService;
use leadshunter::assistant::{
    AdditionalData, AssistantError, LeadAnalysis, LeadSuggestions, PotentialLead, ProspectQuery,
    ProspectSearchResult, ProspectingAssistant, Scripts, VoiceCommandResult,
};
use leadshunter::config::AppConfig;
use leadshunter::funnel::LeadRecord;
use leadshunter::models::lead::Level;
use leadshunter::server::{AppState, create_app};
use serde_json::{Value, json};
use test_utils::{ADMIN_EMAIL, ADMIN_SECRET, seed_admin, setup_test_db};
use tower::ServiceExt;

/// Answers searches and niches; every other call is unavailable.
struct StubAssistant;

#[async_trait]
impl ProspectingAssistant for StubAssistant {
    async fn find_prospects(
        &self,
        query: &ProspectQuery,
    ) -> Result<ProspectSearchResult, AssistantError> {
        Ok(ProspectSearchResult {
            prospects: vec![PotentialLead {
                name: "Padaria Central".to_string(),
                segment: query.segment.clone(),
                city: query.city.clone(),
                state: query.state.clone(),
                phone: None,
                instagram: None,
                site: None,
                recommended_substrate: "BOPP".to_string(),
                products_used: "Etiquetas de validade".to_string(),
                estimated_volume: Level::High,
                purchase_frequency: Level::Medium,
            }],
            total: 37,
        })
    }

    async fn generate_scripts(&self, _lead: &PotentialLead) -> Result<Scripts, AssistantError> {
        Err(AssistantError::unavailable("script generation"))
    }

    async fn analyze_lead(&self, _lead: &PotentialLead) -> Result<LeadAnalysis, AssistantError> {
        Err(AssistantError::unavailable("lead analysis"))
    }

    async fn interpret_voice_command(
        &self,
        _text: &str,
    ) -> Result<VoiceCommandResult, AssistantError> {
        Err(AssistantError::unavailable("voice command"))
    }

    async fn niches_for_segment(&self, _segment: &str, _custom: Option<&str>) -> Vec<String> {
        vec!["Padaria artesanal".to_string()]
    }

    async fn lead_suggestions(
        &self,
        _lead: &LeadRecord,
    ) -> Result<LeadSuggestions, AssistantError> {
        Err(AssistantError::unavailable("lead suggestion"))
    }

    async fn find_additional_data(
        &self,
        _lead: &LeadRecord,
    ) -> Result<AdditionalData, AssistantError> {
        Err(AssistantError::unavailable("lead enrichment"))
    }
}

struct TestApp {
    router: Router,
    accounts: AccountService,
}

impl TestApp {
    async fn new() -> Self {
        let db = setup_test_db().await.unwrap();
        let config = Arc::new(AppConfig {
            database_url: "sqlite::memory:".to_string(),
            ..AppConfig::default()
        });
        let state = AppState::new(db, config, Arc::new(StubAssistant));
        let accounts = state.accounts.clone();
        Self {
            router: create_app(state),
            accounts,
        }
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder()
            .method(method)
            .uri(uri)
            .header("user-agent", "api-tests");
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    async fn login(&self, email: &str, secret: &str) -> String {
        let (status, body) = self
            .send(
                "POST",
                "/api/v1/auth/login",
                None,
                Some(json!({ "email": email, "secret": secret })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["data"]["session_id"].as_str().unwrap().to_string()
    }

    async fn admin_token(&self) -> String {
        seed_admin(&self.accounts).await.unwrap();
        self.login(ADMIN_EMAIL, ADMIN_SECRET).await
    }

    /// Registers a company through the API, approves it and returns the
    /// company id with an owner session.
    async fn approved_company(&self, admin: &str, name: &str, email: &str) -> (String, String) {
        let (status, body) = self
            .send(
                "POST",
                "/api/v1/auth/register",
                None,
                Some(json!({
                    "company_name": name,
                    "owner_name": "Maria",
                    "email": email,
                    "secret": "owner-secret"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        let company_id = body["data"]["company"]["id"].as_str().unwrap().to_string();

        let (status, _) = self
            .send(
                "PUT",
                &format!("/api/v1/admin/companies/{company_id}/status"),
                Some(admin),
                Some(json!({ "status": "active" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let token = self.login(email, "owner-secret").await;
        (company_id, token)
    }
}

#[tokio::test]
async fn health_and_catalog_are_public() {
    let app = TestApp::new().await;

    let (status, body) = app.send("GET", "/healthz", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "ok");

    let (status, body) = app.send("GET", "/api/v1/prospecting/catalog", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let commercial = body["data"]["commercial_segments"].as_array().unwrap();
    assert!(commercial.iter().any(|segment| segment == "Padaria"));
    assert_eq!(body["data"]["other_segment"], "Outro");
    assert_eq!(body["data"]["radius_options"][0], "Apenas na cidade");
    assert!(body["meta"]["request_id"].is_string());

    let (status, body) = app.send("GET", "/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/v1/auth/login"].is_object());
}

#[tokio::test]
async fn pending_company_login_is_forbidden() {
    let app = TestApp::new().await;

    let (status, _) = app
        .send(
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({
                "company_name": "Gráfica Norte",
                "owner_name": "João",
                "email": "joao@norte.com",
                "secret": "owner-secret"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .send(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": "joao@norte.com", "secret": "owner-secret" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "COMPANY_PENDING_APPROVAL");

    let (status, body) = app
        .send(
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({
                "company_name": "Outra",
                "owner_name": "Ana",
                "email": "JOAO@norte.com",
                "secret": "x"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "EMAIL_IN_USE");
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = TestApp::new().await;
    seed_admin(&app.accounts).await.unwrap();

    let (status, body) = app
        .send(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": ADMIN_EMAIL, "secret": "nope" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn preempted_session_is_rejected() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let (_, laptop) = app
        .approved_company(&admin, "Etiquetas Sul", "dono@sul.com")
        .await;

    let (status, body) = app.send("GET", "/api/v1/auth/me", Some(&laptop), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["email"], "dono@sul.com");
    assert_eq!(body["data"]["access_logs"][0]["user_agent"], "api-tests");

    let phone = app.login("dono@sul.com", "owner-secret").await;

    let (status, body) = app.send("GET", "/api/v1/auth/me", Some(&laptop), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "SESSION_INVALIDATED");

    let (status, body) = app
        .send("POST", "/api/v1/auth/heartbeat", Some(&phone), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["alive"], true);
    assert_eq!(body["data"]["interval_seconds"], 15);
}

#[tokio::test]
async fn logout_ends_the_session() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let (status, _) = app
        .send("POST", "/api/v1/auth/logout", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app
        .send("POST", "/api/v1/auth/heartbeat", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "SESSION_INVALIDATED");

    let (status, _) = app.send("GET", "/api/v1/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn role_guards_separate_owner_and_admin() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let (_, owner) = app
        .approved_company(&admin, "Etiquetas Sul", "dono@sul.com")
        .await;

    let (status, _) = app
        .send("GET", "/api/v1/admin/companies", Some(&owner), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send("GET", "/api/v1/company/users", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send("GET", "/api/v1/admin/revenue", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["company_count"], 1);
    assert_eq!(body["data"]["total_revenue"], 50.0);
}

#[tokio::test]
async fn owner_manages_members_and_sees_billing() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let (company_id, owner) = app
        .approved_company(&admin, "Etiquetas Sul", "dono@sul.com")
        .await;
    let (_, other_owner) = app
        .approved_company(&admin, "Rótulos Norte", "dono@norte.com")
        .await;

    let (status, body) = app
        .send(
            "POST",
            "/api/v1/company/users",
            Some(&owner),
            Some(json!({ "name": "Ana", "email": "ana@sul.com", "secret": "ana-secret" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["role"], "user");
    let member_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .send("GET", "/api/v1/company/billing", Some(&owner), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 75.0);
    assert_eq!(body["data"]["billable_members"], 1);

    let member = app.login("ana@sul.com", "ana-secret").await;
    let (status, _) = app
        .send("GET", "/api/v1/company/billing", Some(&member), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let toggle = format!("/api/v1/company/users/{member_id}/toggle");
    let (status, _) = app.send("POST", &toggle, Some(&other_owner), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = app.send("GET", "/api/v1/auth/me", Some(&owner), None).await;
    let owner_id = body["data"]["user"]["id"].as_str().unwrap().to_string();
    let (status, body) = app
        .send(
            "POST",
            &format!("/api/v1/company/users/{owner_id}/toggle"),
            Some(&owner),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
    let (status, body) = app.send("GET", "/api/v1/auth/me", Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["status"], "active");

    let (status, body) = app.send("POST", &toggle, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "inactive");
    assert_eq!(body["data"]["billable_in_current_cycle"], true);

    let (status, body) = app.send("GET", "/api/v1/auth/me", Some(&member), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "SESSION_INVALIDATED");

    let (status, body) = app
        .send(
            "POST",
            &format!("/api/v1/admin/companies/{company_id}/close-cycle"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["last_cycle_closed_at"].is_string());

    let (_, body) = app
        .send("GET", "/api/v1/company/billing", Some(&owner), None)
        .await;
    assert_eq!(body["data"]["total"], 50.0);
}

#[tokio::test]
async fn blocked_company_sessions_are_invalidated() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let (company_id, owner) = app
        .approved_company(&admin, "Etiquetas Sul", "dono@sul.com")
        .await;

    let (status, _) = app
        .send(
            "PUT",
            &format!("/api/v1/admin/companies/{company_id}/status"),
            Some(&admin),
            Some(json!({ "status": "blocked" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.send("GET", "/api/v1/leads", Some(&owner), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "SESSION_INVALIDATED");
}

#[tokio::test]
async fn leads_are_scoped_to_the_company() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let (_, owner) = app
        .approved_company(&admin, "Etiquetas Sul", "dono@sul.com")
        .await;
    let (_, other_owner) = app
        .approved_company(&admin, "Rótulos Norte", "dono@norte.com")
        .await;

    let (status, body) = app
        .send(
            "POST",
            "/api/v1/leads",
            Some(&owner),
            Some(json!({
                "source": "manual",
                "name": "Cervejaria Serra",
                "segment": "Cervejaria",
                "city": "Gramado",
                "state": "RS"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
    let lead_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .send(
            "POST",
            "/api/v1/leads",
            Some(&owner),
            Some(json!({
                "source": "prospect",
                "prospect": {
                    "name": "Padaria Central",
                    "segment": "Padaria",
                    "products_used": "Etiquetas",
                    "recommended_substrate": "BOPP",
                    "estimated_volume": "Alto"
                },
                "city": "Curitiba",
                "state": "PR"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "capture failed: {body}");
    assert_eq!(body["data"]["city"], "Curitiba");
    assert_eq!(body["data"]["potential"], "high");

    let (status, body) = app
        .send(
            "PUT",
            &format!("/api/v1/leads/{lead_id}/status"),
            Some(&owner),
            Some(json!({ "status": "in_conversation" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["history"][0], "Status changed to In conversation");

    let (status, body) = app.send("GET", "/api/v1/leads/board", Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    let columns = body["data"]["columns"].as_array().unwrap();
    assert_eq!(columns.len(), 7);
    assert_eq!(columns[0]["leads"].as_array().unwrap().len(), 1);
    assert_eq!(columns[2]["leads"].as_array().unwrap().len(), 1);

    let lead_uri = format!("/api/v1/leads/{lead_id}");
    let (status, body) = app.send("GET", &lead_uri, Some(&other_owner), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (_, body) = app.send("GET", "/api/v1/leads", Some(&other_owner), None).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, body) = app.send("GET", "/api/v1/leads", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn prospecting_maps_assistant_results_and_failures() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let (_, owner) = app
        .approved_company(&admin, "Etiquetas Sul", "dono@sul.com")
        .await;

    let (status, body) = app
        .send(
            "POST",
            "/api/v1/prospecting/search",
            Some(&owner),
            Some(json!({ "segment": "Padaria", "city": "Curitiba", "state": "PR" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 37);
    assert_eq!(body["data"]["prospects"][0]["city"], "Curitiba");

    let (status, body) = app
        .send(
            "POST",
            "/api/v1/prospecting/search",
            Some(&owner),
            Some(json!({ "segment": "Padaria", "city": " ", "state": "PR" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");

    let (status, body) = app
        .send(
            "POST",
            "/api/v1/prospecting/scripts",
            Some(&owner),
            Some(json!({
                "name": "Padaria Central",
                "segment": "Padaria",
                "products_used": "Etiquetas",
                "recommended_substrate": "BOPP"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "ANALYSIS_UNAVAILABLE");

    let (status, _) = app
        .send(
            "POST",
            "/api/v1/prospecting/voice",
            Some(&owner),
            Some(json!({ "text": "   " })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send(
            "POST",
            "/api/v1/prospecting/niches",
            Some(&owner),
            Some(json!({ "segment": "Padaria" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["niches"][0], "Padaria artesanal");

    let (status, _) = app
        .send(
            "POST",
            "/api/v1/prospecting/search",
            None,
            Some(json!({ "segment": "Padaria", "city": "Curitiba", "state": "PR" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn trace_id_is_echoed_on_responses() {
    let app = TestApp::new().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .header("x-trace-id", "trace-abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-trace-id"], "trace-abc");
}
