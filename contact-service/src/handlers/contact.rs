use axum::{extract::State, Json};
use service_core::error::AppError;
use validator::Validate;

use crate::models::{ContactFormRequest, ContactSubmission};
use crate::services::{format_contact_message, record_contact_submission};
use crate::startup::AppState;

const SUBMIT_FAILED: &str = "Failed to submit form";

/// Accept a contact form, store it when persistence is enabled, and notify
/// every configured chat.
///
/// The notification is sent even when the write fails; the caller then gets
/// the generic failure response.
#[tracing::instrument(skip(state, request))]
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(request): Json<ContactFormRequest>,
) -> Result<Json<ContactSubmission>, AppError> {
    request.validate()?;

    let contact = ContactSubmission::new(request);

    let persisted = match &state.store {
        Some(store) => store.insert_contact(&contact).await,
        None => Ok(()),
    };

    let report = state
        .notifier
        .dispatch(&format_contact_message(&contact))
        .await;

    if !report.is_success() {
        tracing::warn!(
            contact_id = %contact.id,
            attempted = report.attempted(),
            delivered = report.delivered(),
            failed = report.failed(),
            "Contact notification not fully delivered"
        );
    }

    match persisted {
        Ok(()) => {
            record_contact_submission("accepted");
            tracing::info!(contact_id = %contact.id, "Contact form submitted");
            Ok(Json(contact))
        }
        Err(e) => {
            record_contact_submission("persist_failed");
            Err(AppError::opaque(SUBMIT_FAILED, e))
        }
    }
}
