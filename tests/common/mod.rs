#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use incident_tracker::auth::TokenService;
use incident_tracker::config::Config;
use serde_json::{Value, json};
use tower::ServiceExt;

pub const PASSWORD: &str = "correct-horse-battery";

pub struct TestApp {
    pub router: Router,
    pub tokens: TokenService,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub fn test_config() -> Config {
    let db_path =
        std::env::temp_dir().join(format!("incident-tracker-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_url = format!("sqlite:{}", db_path.display());
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config.auth.argon2_memory_cost_kib = 1024;
    config.auth.argon2_time_cost = 1;
    config
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_config()).await
}

pub async fn spawn_app_with(config: Config) -> TestApp {
    let tokens = TokenService::from_config(&config.auth);

    let state = incident_tracker::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");

    TestApp {
        router: incident_tracker::api::router(state),
        tokens,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        // Plain-text bodies (boards, metrics) come back as a JSON string.
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(request("GET", uri, token, None)).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(request("POST", uri, token, Some(body))).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(request("PUT", uri, token, Some(body))).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(request("DELETE", uri, token, None)).await
    }

    pub async fn signup(&self, username: &str, roles: &[&str]) -> TestResponse {
        let mut body = json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": PASSWORD,
        });
        if !roles.is_empty() {
            body["roles"] = json!(roles);
        }
        self.post("/api/auth/signup", None, body).await
    }

    pub async fn signin(&self, username: &str, password: &str) -> TestResponse {
        self.post(
            "/api/auth/signin",
            None,
            json!({ "username": username, "password": password }),
        )
        .await
    }

    /// Registers `username` with `roles` and returns a bearer token for it.
    pub async fn token_for(&self, username: &str, roles: &[&str]) -> String {
        let response = self.signup(username, roles).await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

        let response = self.signin(username, PASSWORD).await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

        response.body["accessToken"].as_str().unwrap().to_string()
    }

    pub async fn create_incident(&self, token: &str, body: Value) -> Value {
        let response = self.post("/api/incidents", Some(token), body).await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body
    }
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
