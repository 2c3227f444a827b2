use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::mail;
use crate::models::{MessagePayload, MessageResponse};
use crate::state::AppState;

/// Email routes
pub fn email_routes() -> Router<AppState> {
    Router::new().route("/email", post(send_email))
}

/// POST /email - Deliver a message through the configured providers
async fn send_email(State(state): State<AppState>, body: Bytes) -> Result<Response> {
    let value: Value = serde_json::from_slice(&body).map_err(|_| AppError::InvalidJson)?;
    if value.is_null() {
        return Err(AppError::InvalidJson);
    }

    let payload = MessagePayload::from_value(&value).inspect_err(|e| {
        tracing::debug!(error = %e, "Rejected payload");
    })?;

    let report = mail::deliver_with_report(&state.registry, &payload)
        .await
        .inspect_err(|e| {
            tracing::debug!(error = %e, "Delivery aborted");
        })?;

    let outcome = report.outcome;
    tracing::debug!(
        status = outcome.status_code,
        body = %outcome.body,
        attempted = ?report.attempted,
        "Delivery finished"
    );

    let status = StatusCode::from_u16(outcome.status_code).unwrap_or(StatusCode::BAD_GATEWAY);
    Ok((
        status,
        Json(MessageResponse {
            message: outcome.body,
        }),
    )
        .into_response())
}
