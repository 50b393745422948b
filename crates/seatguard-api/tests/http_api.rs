//! End-to-end HTTP tests against the in-process store.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::Duration;
use serde_json::{Value, json};
use tower::ServiceExt;

use seatguard_api::{AppState, build_app};
use seatguard_auth::{PasswordHasher, SeatEngine};
use seatguard_core::config::{AppConfig, StoreBackend};
use seatguard_core::types::{ActivityWindow, ManualClock};
use seatguard_database::{MemorySeatStore, SeatStore};
use seatguard_entity::organization::{NewOrganization, Organization};
use seatguard_entity::user::NewUser;

const PASSWORD: &str = "correct-horse-battery";

struct TestApp {
    app: Router,
    store: MemorySeatStore,
    clock: Arc<ManualClock>,
}

impl TestApp {
    async fn new() -> Self {
        let store = MemorySeatStore::new();
        let clock = Arc::new(ManualClock::starting_now());
        let engine = SeatEngine::with_window(
            Arc::new(store.clone()),
            clock.clone(),
            ActivityWindow::from_minutes(30),
            0,
        );
        let mut config = AppConfig::default();
        config.store.backend = StoreBackend::Memory;

        Self {
            app: build_app(AppState::new(config, engine)),
            store,
            clock,
        }
    }

    async fn organization(&self, name: &str, seat_limit: i32, users: &[&str]) -> Organization {
        let org = self
            .store
            .insert_organization(NewOrganization {
                name: name.to_string(),
                seat_limit,
            })
            .await
            .unwrap();
        let hash = PasswordHasher::new().hash_password(PASSWORD).unwrap();
        for username in users {
            self.store
                .insert_user(NewUser {
                    username: username.to_string(),
                    email: None,
                    password_hash: hash.clone(),
                    organization_id: org.id,
                })
                .await
                .unwrap();
        }
        org
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn login(&self, username: &str) -> (StatusCode, Value) {
        self.post(
            "/api/login",
            json!({ "username": username, "password": PASSWORD }),
        )
        .await
    }

    async fn login_token(&self, username: &str) -> String {
        let (status, body) = self.login(username).await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["data"]["token"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_login_admits_and_returns_token() {
    let app = TestApp::new().await;
    let org = app.organization("Acme Corp", 10, &["john_doe"]).await;

    let (status, body) = app.login("john_doe").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user"]["username"], "john_doe");
    assert_eq!(body["data"]["user"]["organization_id"], org.id.to_string());
    assert!(body["data"]["token"].as_str().unwrap().len() >= 43);
    assert!(body["data"]["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_bad_credentials_are_indistinguishable() {
    let app = TestApp::new().await;
    app.organization("Acme Corp", 10, &["john_doe"]).await;

    let (wrong_pw, wrong_pw_body) = app
        .post(
            "/api/login",
            json!({ "username": "john_doe", "password": "nope" }),
        )
        .await;
    let (unknown, unknown_body) = app.login("nobody").await;

    assert_eq!(wrong_pw, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw_body, unknown_body);
    assert_eq!(unknown_body["error"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_full_organization_answers_no_seats() {
    let app = TestApp::new().await;
    app.organization("Small Biz LLC", 1, &["alice_brown", "charlie_davis"])
        .await;

    app.login_token("alice_brown").await;
    let (status, body) = app.login("charlie_davis").await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "NO_SEATS_AVAILABLE");
}

#[tokio::test]
async fn test_zero_seat_organization_never_admits() {
    let app = TestApp::new().await;
    app.organization("Frozen Inc", 0, &["bob_wilson"]).await;

    let (status, body) = app.login("bob_wilson").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "NO_SEATS_AVAILABLE");
}

#[tokio::test]
async fn test_logout_is_idempotent_and_frees_the_seat() {
    let app = TestApp::new().await;
    app.organization("Small Biz LLC", 1, &["alice_brown", "charlie_davis"])
        .await;
    let token = app.login_token("alice_brown").await;

    let (status, body) = app.post("/api/logout", json!({ "token": token })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["released"], true);

    let (status, body) = app.post("/api/logout", json!({ "token": token })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["released"], false);

    let (status, _) = app.login("charlie_davis").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_heartbeat_after_timeout_is_unauthorized() {
    let app = TestApp::new().await;
    app.organization("Acme Corp", 10, &["john_doe"]).await;
    let token = app.login_token("john_doe").await;

    let (status, body) = app.post("/api/heartbeat", json!({ "token": token })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["active"], true);

    app.clock.advance(Duration::minutes(45));
    let (status, body) = app.post("/api/heartbeat", json!({ "token": token })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "SESSION_INACTIVE");
}

#[tokio::test]
async fn test_empty_token_fails_validation() {
    let app = TestApp::new().await;
    let (status, body) = app.post("/api/logout", json!({ "token": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_seat_status_requires_session_of_same_organization() {
    let app = TestApp::new().await;
    let acme = app.organization("Acme Corp", 10, &["john_doe"]).await;
    app.organization("TechStart Inc", 50, &["jane_smith"]).await;
    let acme_token = app.login_token("john_doe").await;
    let techstart_token = app.login_token("jane_smith").await;
    let uri = format!("/api/organizations/{}/seats", acme.id);

    let (status, _) = app.get(&uri, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.get(&uri, Some(&techstart_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");

    let (status, body) = app.get(&uri, Some(&acme_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["seat_limit"], 10);
    assert_eq!(body["data"]["active_seats"], 1);
    assert_eq!(body["data"]["available_seats"], 9);
}

#[tokio::test]
async fn test_sessions_and_audit_views() {
    let app = TestApp::new().await;
    let org = app
        .organization("Acme Corp", 10, &["john_doe", "jane_smith"])
        .await;
    let token = app.login_token("john_doe").await;
    let other = app.login_token("jane_smith").await;
    app.post("/api/logout", json!({ "token": other })).await;

    let (status, body) = app
        .get(&format!("/api/organizations/{}/sessions", org.id), Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = app
        .get(&format!("/api/organizations/{}/audit", org.id), Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    let actions: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["action"].as_str().unwrap())
        .collect();
    assert_eq!(
        actions,
        ["SEAT_DEALLOCATED", "SEAT_ALLOCATED", "SEAT_ALLOCATED"]
    );

    let (status, body) = app
        .get(
            &format!("/api/organizations/{}/audit?limit=0", org.id),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_store_failure_is_service_unavailable_without_detail() {
    let app = TestApp::new().await;
    app.organization("Acme Corp", 10, &["john_doe"]).await;
    app.store.fail_begin(true);

    let (status, body) = app.login("john_doe").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "SERVICE_UNAVAILABLE");
    assert_eq!(
        body["message"],
        "Service temporarily unavailable, please retry"
    );
}

#[tokio::test]
async fn test_health_reports_backend() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["store"], "memory");
}
