//! Router tests: the full Axum app over in-memory storage

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use screen_api::{create_app, AppState};
use screen_common::{
    AppConfig, AppSettings, CorsConfig, DatabaseConfig, Environment, JwtConfig, RateLimitConfig,
    ServerConfig, SnowflakeConfig,
};
use screen_service::testing::{MemoryStore, TEST_JWT_SECRET};
use serde_json::{json, Value};
use tower::util::ServiceExt;

fn test_config() -> AppConfig {
    AppConfig {
        app: AppSettings {
            name: "screen-time-test".to_string(),
            env: Environment::Development,
        },
        api: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig {
            url: String::new(),
            max_connections: 1,
            min_connections: 0,
            migrate_on_start: false,
        },
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            token_expiry: 3600,
        },
        rate_limit: RateLimitConfig {
            requests_per_second: 1000,
            burst: 10_000,
        },
        cors: CorsConfig::default(),
        snowflake: SnowflakeConfig::default(),
    }
}

struct TestApp {
    router: Router,
}

impl TestApp {
    fn new() -> Self {
        let context = MemoryStore::new().context().unwrap();
        let router = create_app(AppState::new(context, test_config())).unwrap();
        Self { router }
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.call(Method::GET, uri, Some(token), None).await
    }

    async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, Some(token), Some(body)).await
    }

    /// Sign up and return `(token, user_id)`
    async fn signup(&self, username: &str) -> (String, String) {
        let (status, body) = self
            .call(
                Method::POST,
                "/signup",
                None,
                Some(json!({
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": "correct-horse-battery",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        (
            body["token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_str().unwrap().to_string(),
        )
    }

    async fn befriend(&self, a: &str, b_token: &str, b_name: &str) {
        let (status, _) = self
            .post("/send-request", a, json!({ "username": b_name }))
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, requests) = self.get("/friend-requests", b_token).await;
        let request_id = requests["received_requests"][0]["id"].clone();
        let (status, _) = self
            .post(
                "/handle-request",
                b_token,
                json!({ "request_id": request_id, "action": "accept" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    async fn create_competition(&self, token: &str, title: &str) -> String {
        let now = Utc::now();
        let (status, body) = self
            .post(
                "/competitions/create",
                token,
                json!({
                    "title": title,
                    "description": "Less scrolling",
                    "start_date": now - Duration::hours(1),
                    "end_date": now + Duration::days(7),
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_health_probes() {
    let app = TestApp::new();

    let (status, body) = app.call(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = app.call(Method::GET, "/health/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "skipped");
}

#[tokio::test]
async fn test_signup_login_and_isauth() {
    let app = TestApp::new();
    let (token, _) = app.signup("alice").await;

    let (status, body) = app.get("/isauth", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "The user is authenticated");

    let (status, body) = app
        .call(
            Method::POST,
            "/login",
            None,
            Some(json!({ "username": "alice", "password": "correct-horse-battery" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "alice");

    let (status, body) = app
        .call(
            Method::POST,
            "/login",
            None,
            Some(json!({ "username": "alice", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_auth_is_required() {
    let app = TestApp::new();

    let (status, body) = app.call(Method::GET, "/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
    assert!(body["code"].is_string());

    let (status, _) = app.get("/competitions", "not-a-token").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signup_errors() {
    let app = TestApp::new();
    app.signup("alice").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/signup",
            None,
            Some(json!({
                "username": "alice2",
                "email": "alice@example.com",
                "password": "correct-horse-battery",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email already registered");

    let (status, body) = app
        .call(
            Method::POST,
            "/signup",
            None,
            Some(json!({
                "username": "carol",
                "email": "carol@example.com",
                "password": "short",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Password must be 8-128 characters");
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_profile_update_and_delete() {
    let app = TestApp::new();
    let (token, _) = app.signup("alice").await;

    let (status, body) = app
        .call(
            Method::PUT,
            "/profile/update",
            Some(&token),
            Some(json!({ "name": "Alice", "daily_screen_time_goal": 90 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Alice");
    assert_eq!(body["daily_screen_time_goal"], 90);

    let (status, _) = app
        .call(Method::DELETE, "/profile/delete", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // The token outlives the account but no longer authenticates
    let (status, _) = app.get("/profile", &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_reverse_friend_request_returns_ok() {
    let app = TestApp::new();
    let (alice, _) = app.signup("alice").await;
    let (bob, _) = app.signup("bob").await;

    let (status, body) = app
        .post("/send-request", &alice, json!({ "username": "bob" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], "Friend request sent to bob");

    let (status, _) = app
        .post("/send-request", &bob, json!({ "username": "alice" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    for token in [&alice, &bob] {
        let (status, friends) = app.get("/friendships", token).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(friends.as_array().unwrap().len(), 1);
    }

    let (status, body) = app
        .post("/send-request", &alice, json!({ "username": "alice" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Cannot send friend request to yourself");
}

#[tokio::test]
async fn test_competition_lifecycle() {
    let app = TestApp::new();
    let (carol, _) = app.signup("carol").await;
    let (dave, _) = app.signup("dave").await;
    let (erin, _) = app.signup("erin").await;
    app.befriend(&carol, &dave, "dave").await;

    let competition_id = app.create_competition(&carol, "Detox week").await;
    let detail_uri = format!("/competitions/{competition_id}");

    // Invitation flow
    let (status, body) = app
        .post(
            "/competitions/invitations/send",
            &carol,
            json!({ "competition_id": competition_id, "username": "erin" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "You can only invite friends to competitions");

    let (status, invitation) = app
        .post(
            "/competitions/invitations/send",
            &carol,
            json!({ "competition_id": competition_id, "username": "dave" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, pending) = app.get("/competitions/invitations", &dave).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending.as_array().unwrap().len(), 1);

    let (status, body) = app
        .post(
            "/competitions/invitations/handle",
            &dave,
            json!({ "invitation_id": invitation["id"], "action": "accept" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], "Invitation accepted");

    let (status, sent) = app.get("/competitions/invitations/sent", &carol).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sent[0]["id"], invitation["id"]);
    assert_eq!(sent[0]["status"], "accepted");

    // Usage reports
    let (status, body) = app
        .post(
            "/competitions/screen-time/update",
            &dave,
            json!({ "screen_time_minutes": 30 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated_competitions"].as_array().unwrap().len(), 1);
    app.post(
        "/competitions/screen-time/update",
        &carol,
        json!({ "screen_time_minutes": 45 }),
    )
    .await;

    let (status, detail) = app.get(&detail_uri, &carol).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["status"], "active");
    assert_eq!(detail["total_participants"], 2);
    let ranked = detail["leaderboard"]["ranked"].as_array().unwrap();
    assert_eq!(ranked[0]["user"]["username"], "dave");
    assert_eq!(ranked[0]["position"], 1);
    assert_eq!(ranked[1]["user"]["username"], "carol");
    assert_eq!(ranked[1]["position"], 2);

    // Access rules
    let (status, body) = app.get(&detail_uri, &erin).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "You don't have access to this competition");

    let (status, body) = app
        .post(&format!("{detail_uri}/leave"), &carol, json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Competition creator cannot leave the competition");

    let (status, _) = app
        .post(&format!("{detail_uri}/cancel"), &dave, json!({}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .post(&format!("{detail_uri}/leave"), &dave, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], "You have left the competition 'Detox week'");

    let (status, detail) = app
        .post(&format!("{detail_uri}/cancel"), &carol, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["status"], "cancelled");
    assert_eq!(detail["total_participants"], 1);
}

#[tokio::test]
async fn test_competition_listings() {
    let app = TestApp::new();
    let (carol, _) = app.signup("carol").await;
    let active_id = app.create_competition(&carol, "Running now").await;

    let now = Utc::now();
    let (status, _) = app
        .post(
            "/competitions/create",
            &carol,
            json!({
                "title": "Next month",
                "start_date": now + Duration::days(30),
                "end_date": now + Duration::days(37),
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, all) = app.get("/competitions", &carol).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, active) = app.get("/competitions/active", &carol).await;
    let active = active.as_array().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0]["id"], active_id.as_str());

    let (_, future) = app.get("/competitions/future", &carol).await;
    let future = future.as_array().unwrap();
    assert_eq!(future.len(), 1);
    assert_eq!(future[0]["status"], "upcoming");
}

#[tokio::test]
async fn test_competition_errors() {
    let app = TestApp::new();
    let (carol, _) = app.signup("carol").await;

    let (status, body) = app.get("/competitions/123456789", &carol).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Competition not found");

    let (status, _) = app.get("/competitions/not-an-id", &carol).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let now = Utc::now();
    let (status, body) = app
        .post(
            "/competitions/create",
            &carol,
            json!({
                "title": "Backwards",
                "start_date": now + Duration::days(2),
                "end_date": now + Duration::days(1),
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "End date must be after start date");

    let (status, body) = app
        .post(
            "/competitions/screen-time/update",
            &carol,
            json!({ "screen_time_minutes": -5 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Screen time must be a non-negative number");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = TestApp::new();
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "req-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-123");
}
