use axum::{extract::State, Json};
use service_core::error::AppError;
use std::sync::Arc;

use crate::models::{StatusCheck, StatusCheckRequest};
use crate::services::{record_status_check, SubmissionStore};
use crate::startup::AppState;

/// Upper bound on records returned by `GET /api/status`. There is no
/// pagination; anything past this is not reachable through the API.
pub const STATUS_LIST_LIMIT: i64 = 1000;

fn store(state: &AppState) -> Result<&Arc<dyn SubmissionStore>, AppError> {
    state
        .store
        .as_ref()
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Persistence is not enabled")))
}

#[tracing::instrument(skip(state, request))]
pub async fn create_status_check(
    State(state): State<AppState>,
    Json(request): Json<StatusCheckRequest>,
) -> Result<Json<StatusCheck>, AppError> {
    let store = store(&state)?;
    let check = StatusCheck::new(request);

    store
        .insert_status_check(&check)
        .await
        .map_err(|e| AppError::opaque("Internal server error", e))?;

    record_status_check();
    tracing::info!(status_check_id = %check.id, "Status check recorded");

    Ok(Json(check))
}

#[tracing::instrument(skip(state))]
pub async fn list_status_checks(
    State(state): State<AppState>,
) -> Result<Json<Vec<StatusCheck>>, AppError> {
    let checks = store(&state)?
        .list_status_checks(STATUS_LIST_LIMIT)
        .await
        .map_err(|e| AppError::opaque("Internal server error", e))?;

    Ok(Json(checks))
}
