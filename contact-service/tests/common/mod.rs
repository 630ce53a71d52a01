#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use contact_service::config::{
    ContactConfig, CorsConfig, MongoConfig, ObservabilityConfig, TelegramConfig,
};
use contact_service::services::{MockStore, SubmissionStore};
use contact_service::{build_router, AppState};
use http_body_util::BodyExt;
use secrecy::Secret;
use serde_json::Value;
use service_core::config::Config as CoreConfig;
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::{Match, Mock, MockServer, ResponseTemplate};

pub const TEST_TOKEN: &str = "test-token";

#[derive(Clone, Copy, PartialEq)]
pub enum StoreMode {
    Working,
    Failing,
    Disabled,
}

pub struct TestOptions {
    pub token: Option<&'static str>,
    pub chat_ids: Vec<&'static str>,
    /// Chats for which the mock API answers 400.
    pub rejecting_chats: Vec<&'static str>,
    pub store: StoreMode,
    pub allowed_origins: Vec<&'static str>,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            token: Some(TEST_TOKEN),
            chat_ids: vec!["100", "200"],
            rejecting_chats: Vec::new(),
            store: StoreMode::Working,
            allowed_origins: vec!["*"],
        }
    }
}

/// Matches `sendMessage` calls addressed to one chat.
struct ChatIdIs(&'static str);

impl Match for ChatIdIs {
    fn matches(&self, request: &wiremock::Request) -> bool {
        serde_json::from_slice::<Value>(&request.body)
            .map(|body| body["chat_id"] == self.0)
            .unwrap_or(false)
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MockStore>,
    pub telegram: MockServer,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(TestOptions::default()).await
    }

    pub async fn spawn_with(options: TestOptions) -> Self {
        let telegram = MockServer::start().await;

        for chat in &options.rejecting_chats {
            Mock::given(ChatIdIs(*chat))
                .respond_with(ResponseTemplate::new(400).set_body_string(
                    r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#,
                ))
                .mount(&telegram)
                .await;
        }
        Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path(format!("/bot{}/sendMessage", TEST_TOKEN)))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
            .mount(&telegram)
            .await;

        let config = ContactConfig {
            common: CoreConfig::default(),
            mongodb: (options.store != StoreMode::Disabled).then(|| MongoConfig {
                uri: Secret::new("mongodb://unused".to_string()),
                database: "unused".to_string(),
            }),
            telegram: TelegramConfig {
                bot_token: options.token.map(|t| Secret::new(t.to_string())),
                chat_ids: options.chat_ids.iter().map(|c| c.to_string()).collect(),
                api_base_url: telegram.uri(),
            },
            cors: CorsConfig {
                allowed_origins: options
                    .allowed_origins
                    .iter()
                    .map(|o| o.to_string())
                    .collect(),
            },
            observability: ObservabilityConfig {
                log_level: "error".to_string(),
                otlp_endpoint: None,
            },
        };

        let store = Arc::new(match options.store {
            StoreMode::Failing => MockStore::failing(),
            _ => MockStore::new(),
        });
        let state_store = match options.store {
            StoreMode::Disabled => None,
            _ => Some(store.clone() as Arc<dyn SubmissionStore>),
        };

        TestApp {
            router: build_router(AppState::new(config, state_store)),
            store,
            telegram,
        }
    }

    pub async fn request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Chat ids of every `sendMessage` call the mock API received, in order.
    pub async fn notified_chats(&self) -> Vec<String> {
        self.telegram
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|r| serde_json::from_slice::<Value>(&r.body).ok())
            .filter_map(|body| body["chat_id"].as_str().map(str::to_string))
            .collect()
    }

    pub async fn telegram_call_count(&self) -> usize {
        self.telegram
            .received_requests()
            .await
            .map(|r| r.len())
            .unwrap_or(0)
    }
}
