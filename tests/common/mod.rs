//! Shared test utilities for integration tests.
//!
//! `TestClient` drives the full router against an in-memory database.
//! `MockGemini` is a tiny local stand-in for the generative language API so
//! the AI routes can be exercised without network access.

#![allow(dead_code)]

use axum::body::Body;
use axum::extract::State;
use axum::http::{Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use finsight::config::{AiConfig, Config};
use finsight::db::{create_in_memory_pool, migrations};
use finsight::server;
use finsight::services::ai_client::GeminiClient;
use finsight::state::AppState;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

/// What the mock API answers with.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Status(u16, String),
    /// Answer with text, but only after sleeping.
    Delayed(Duration, String),
}

#[derive(Debug, Default)]
struct MockInner {
    reply: Option<MockReply>,
    prompts: Vec<String>,
    api_keys: Vec<String>,
}

/// A local server that speaks just enough of `generateContent`.
#[derive(Clone)]
pub struct MockGemini {
    inner: Arc<Mutex<MockInner>>,
    pub base_url: String,
}

impl MockGemini {
    pub async fn start() -> Self {
        let inner = Arc::new(Mutex::new(MockInner::default()));

        let app = Router::new()
            .route("/v1beta/models/:call", post(generate_content))
            .with_state(inner.clone());
        let (port, _handle) = server::serve(app, "127.0.0.1", 0)
            .await
            .expect("Failed to start mock Gemini server");

        Self {
            inner,
            base_url: format!("http://127.0.0.1:{}", port),
        }
    }

    pub fn reply_with(&self, text: impl Into<String>) {
        self.inner.lock().unwrap().reply = Some(MockReply::Text(text.into()));
    }

    pub fn reply_after(&self, delay: Duration, text: impl Into<String>) {
        self.inner.lock().unwrap().reply = Some(MockReply::Delayed(delay, text.into()));
    }

    pub fn fail_with(&self, status: u16, body: impl Into<String>) {
        self.inner.lock().unwrap().reply = Some(MockReply::Status(status, body.into()));
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.inner.lock().unwrap().prompts.clone()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts().last().cloned()
    }

    pub fn api_keys(&self) -> Vec<String> {
        self.inner.lock().unwrap().api_keys.clone()
    }
}

async fn generate_content(
    State(inner): State<Arc<Mutex<MockInner>>>,
    headers: axum::http::HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let prompt = body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    let api_key = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let reply = {
        let mut inner = inner.lock().unwrap();
        inner.prompts.push(prompt);
        inner.api_keys.push(api_key);
        inner.reply.clone()
    };

    match reply {
        Some(MockReply::Text(text)) => completion(&text),
        Some(MockReply::Delayed(delay, text)) => {
            tokio::time::sleep(delay).await;
            completion(&text)
        }
        Some(MockReply::Status(code, body)) => (
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body,
        )
            .into_response(),
        None => Json(json!({ "candidates": [] })).into_response(),
    }
}

fn completion(text: &str) -> Response {
    Json(json!({
        "candidates": [{ "content": { "parts": [{ "text": text }], "role": "model" } }]
    }))
    .into_response()
}

/// A test client that drives the full router, including auth middleware.
pub struct TestClient {
    state: AppState,
}

impl TestClient {
    /// A client whose AI routes have no API key configured.
    pub fn new() -> Self {
        Self::with_ai_config(AiConfig::default())
    }

    /// A client whose AI routes talk to `mock`.
    pub fn with_mock(mock: &MockGemini) -> Self {
        Self::with_mock_timeout(mock, Duration::from_secs(5))
    }

    pub fn with_mock_timeout(mock: &MockGemini, timeout: Duration) -> Self {
        Self::with_ai_config(AiConfig {
            api_key: Some("test-key".into()),
            base_url: mock.base_url.clone(),
            model: "gemini-test".into(),
            timeout,
        })
    }

    pub fn with_ai_config(ai: AiConfig) -> Self {
        let pool = create_in_memory_pool().expect("Failed to create in-memory pool");
        {
            let conn = pool.get().expect("Failed to get connection");
            migrations::run_migrations(&conn, Path::new("migrations"))
                .expect("Failed to run migrations");
        }

        let config = Config {
            host: "127.0.0.1".into(),
            port: 5000,
            database_path: PathBuf::from(":memory:"),
            migrations_path: PathBuf::from("migrations"),
            static_path: PathBuf::from("static"),
            session_ttl_days: 30,
            ai: ai.clone(),
        };
        let client = GeminiClient::new(&ai).expect("Failed to build Gemini client");

        Self {
            state: AppState::new(pool, config, client),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn router(&self) -> Router {
        server::router(self.state.clone())
    }

    /// Send a request and return status and raw body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, String) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    /// Send a raw, possibly malformed body and parse the JSON response.
    pub async fn request_raw(
        &self,
        method: Method,
        uri: &str,
        token: &str,
        content_type: &str,
        body: &str,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", content_type)
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    /// Like [`Self::request`], parsing the body as JSON (`Value::Null` if it isn't).
    pub async fn request_json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, body) = self.request(method, uri, token, body).await;
        (status, serde_json::from_str(&body).unwrap_or(Value::Null))
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request_json(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request_json(Method::POST, uri, Some(token), Some(body))
            .await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request_json(Method::PUT, uri, Some(token), Some(body))
            .await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request_json(Method::DELETE, uri, Some(token), None)
            .await
    }

    // =========================================================================
    // Helper methods for creating entities through the API
    // =========================================================================

    /// Register a user and return the issued token.
    pub async fn register(&self, name: &str, email: &str) -> String {
        let (status, body) = self
            .request_json(
                Method::POST,
                "/api/users/register",
                None,
                Some(json!({ "name": name, "email": email, "password": "secret123" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        body["token"].as_str().expect("token in body").to_string()
    }

    /// Id of the user behind `token`, looked up through `/api/users`.
    pub async fn user_id(&self, token: &str, email: &str) -> i64 {
        let (_, users) = self.get("/api/users", token).await;
        users
            .as_array()
            .expect("user list")
            .iter()
            .find(|u| u["email"] == email)
            .and_then(|u| u["id"].as_i64())
            .expect("registered user is listed")
    }

    pub async fn add_expense(&self, token: &str, category: &str, amount: f64) -> Value {
        let (status, body) = self
            .post(
                "/api/expenses",
                token,
                json!({ "category": category, "amount": amount, "date": "2024-03-10" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create expense failed: {}", body);
        body
    }

    pub async fn add_income(&self, token: &str, source: &str, amount: f64) -> Value {
        let (status, body) = self
            .post(
                "/api/income",
                token,
                json!({ "source": source, "amount": amount, "date": "2024-03-01" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create income failed: {}", body);
        body
    }
}
