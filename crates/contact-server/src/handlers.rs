//! HTTP Handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::Value;

use contact_core::{validate, ContactError, ContactSubmission, SubmissionId};

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub mail_configured: bool,
    pub submissions: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
    pub id: SubmissionId,
}

#[derive(Debug, Serialize)]
pub struct SubmitFailure {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type Rejection<T> = (StatusCode, Json<T>);

fn reject(status: StatusCode, error: impl Into<String>) -> Rejection<SubmitFailure> {
    (
        status,
        Json(SubmitFailure {
            success: false,
            error: error.into(),
        }),
    )
}

/// Run a store call on the blocking pool; the file store holds a mutex
/// across a write and flush.
async fn blocking<T, F>(call: F) -> contact_core::Result<T>
where
    F: FnOnce() -> contact_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(call)
        .await
        .unwrap_or_else(|e| Err(ContactError::Persistence(format!("store task failed: {e}"))))
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        mail_configured: state.notifier.is_live(),
        submissions: state.store.count().ok(),
    })
}

/// Accept a contact form submission
///
/// Validate, persist, then notify. Only the first two steps can fail the
/// request; the notification outcome is logged and otherwise ignored.
pub async fn submit_contact(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SubmitResponse>, Rejection<SubmitFailure>> {
    let Json(payload) = payload.map_err(|rejection| {
        tracing::warn!("Contact form rejected: {}", rejection.body_text());
        reject(StatusCode::BAD_REQUEST, rejection.body_text())
    })?;

    let new_submission = validate(&payload).map_err(|e| {
        tracing::warn!("Contact form rejected: {}", e);
        reject(StatusCode::BAD_REQUEST, e.user_message())
    })?;

    let store = state.store.clone();
    let submission = blocking(move || store.create(new_submission)).await.map_err(|e| {
        tracing::error!("Contact form error: {}", e);
        reject(StatusCode::INTERNAL_SERVER_ERROR, e.user_message())
    })?;

    tracing::info!(
        id = %submission.id,
        name = %submission.name,
        email = %submission.email,
        service = submission.service.as_deref().unwrap_or("-"),
        "New contact submission received"
    );

    let outcome = state.notifier.notify(&submission).await;
    tracing::debug!(id = %submission.id, ?outcome, "Notification finished");

    Ok(Json(SubmitResponse {
        success: true,
        message: "Contact form submitted successfully".into(),
        id: submission.id,
    }))
}

/// List every stored submission in insertion order
///
/// No authentication: anyone who can reach this route can read all
/// collected contact data.
pub async fn list_submissions(
    State(state): State<AppState>,
) -> Result<Json<Vec<ContactSubmission>>, Rejection<ErrorResponse>> {
    let store = state.store.clone();
    blocking(move || store.list_all()).await.map(Json).map_err(|e| {
        tracing::error!("Error fetching submissions: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to fetch submissions".into(),
            }),
        )
    })
}
