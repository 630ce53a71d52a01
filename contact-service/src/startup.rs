//! Application startup and lifecycle management.
//!
//! Builds the shared [`AppState`] once, wires the HTTP router, and owns the
//! database client so it can be closed after the server stops.

use crate::config::ContactConfig;
use crate::handlers;
use crate::services::{MongoStore, SubmissionStore, TelegramNotifier};
use axum::{
    body::Body,
    http::HeaderValue,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use secrecy::ExposeSecret;
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    tracing::{make_request_span, request_id_middleware},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ContactConfig,
    /// `None` when persistence is disabled.
    pub store: Option<Arc<dyn SubmissionStore>>,
    pub notifier: TelegramNotifier,
}

impl AppState {
    pub fn new(config: ContactConfig, store: Option<Arc<dyn SubmissionStore>>) -> Self {
        let notifier = TelegramNotifier::new(config.telegram.clone());
        Self {
            config,
            store,
            notifier,
        }
    }
}

/// Build the full router. The `/api/status` routes exist only when a store is
/// configured.
pub fn build_router(state: AppState) -> Router {
    let mut api = Router::new()
        .route("/api", get(handlers::root))
        .route("/api/", get(handlers::root))
        .route("/api/contact", post(handlers::submit_contact));

    if state.store.is_some() {
        api = api.route(
            "/api/status",
            get(handlers::list_status_checks).post(handlers::create_status_check),
        );
    }

    let cors = cors_layer(&state.config.cors.allowed_origins);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .merge(api)
        .route_layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<Body>))
        .layer(from_fn(request_id_middleware))
        .layer(cors)
        .with_state(state)
}

/// CORS for the configured origins. `*` allows any origin without
/// credentials; an explicit list allows credentials and mirrors the requested
/// methods and headers.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() || allowed_origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(AllowOrigin::any())
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins = allowed_origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("Invalid CORS origin '{}': {}. Skipping.", o, e);
                None
            }
        })
        .collect::<Vec<HeaderValue>>();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
    db: Option<MongoStore>,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: ContactConfig) -> Result<Self, AppError> {
        let db = match &config.mongodb {
            Some(mongo) => Some(
                MongoStore::connect(mongo.uri.expose_secret(), &mongo.database)
                    .await
                    .map_err(|e| {
                        tracing::error!("Failed to connect to MongoDB: {}", e);
                        e
                    })?,
            ),
            None => {
                tracing::warn!("MONGO_URL not set, running without persistence");
                None
            }
        };

        let store = db
            .clone()
            .map(|db| Arc::new(db) as Arc<dyn SubmissionStore>);

        let state = AppState::new(config.clone(), store);
        if state.notifier.is_configured() {
            tracing::info!(
                recipients = state.notifier.chat_ids().len(),
                "Telegram notifier initialized"
            );
        } else {
            tracing::warn!("Telegram bot token not configured - notifications will not be sent");
        }

        // Port 0 binds a random port for testing
        let addr = SocketAddr::new(config.common.host, config.common.port);
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Contact service: HTTP on port {}", port);

        Ok(Self {
            port,
            listener,
            router: build_router(state),
            db,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get a reference to the database, if persistence is enabled.
    pub fn db(&self) -> Option<&MongoStore> {
        self.db.as_ref()
    }

    /// Serve until Ctrl-C / SIGTERM, then close the database client.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let result = axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await;

        if let Err(e) = &result {
            tracing::error!("HTTP server error: {}", e);
        }

        if let Some(db) = self.db {
            db.close().await;
        }

        result
    }
}
