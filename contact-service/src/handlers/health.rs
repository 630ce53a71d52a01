use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::services::get_metrics;
use crate::startup::AppState;

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "contact-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Ready when the store answers, or immediately when persistence is off.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let Some(store) = state.store.as_ref() else {
        return StatusCode::OK;
    };

    match store.health_check().await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}
