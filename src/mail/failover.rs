//! Ordered provider failover for a single message.
//!
//! The configured default is always tried first. On anything but a 200 the
//! remaining providers are tried one at a time in registry order until one
//! returns 200. Unreachable providers count as failed attempts; validation,
//! markup and lookup errors abort the whole pass.

use std::collections::HashSet;

use axum::http::StatusCode;

use super::ProviderRegistry;
use crate::error::Result;
use crate::models::{DeliveryOutcome, MessagePayload};

/// How a failover pass ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailoverState {
    Succeeded,
    Exhausted,
}

/// Final outcome of a pass and the providers it went through
#[derive(Debug, Clone)]
pub struct FailoverReport {
    pub outcome: DeliveryOutcome,
    pub attempted: Vec<String>,
    pub state: FailoverState,
}

/// Deliver `payload`, returning the outcome of the last attempt made.
pub async fn deliver(registry: &ProviderRegistry, payload: &MessagePayload) -> Result<DeliveryOutcome> {
    deliver_with_report(registry, payload)
        .await
        .map(|report| report.outcome)
}

pub async fn deliver_with_report(
    registry: &ProviderRegistry,
    payload: &MessagePayload,
) -> Result<FailoverReport> {
    let mut failed: HashSet<&str> = HashSet::new();
    let mut attempted = Vec::new();

    let default = registry.default_name();
    let mut outcome = attempt(registry, default, payload).await?;
    failed.insert(default);
    attempted.push(default.to_string());

    if !outcome.is_success() {
        for config in registry.providers() {
            if failed.contains(config.name.as_str()) {
                continue;
            }

            outcome = attempt(registry, &config.name, payload).await?;
            failed.insert(&config.name);
            attempted.push(config.name.clone());

            if outcome.is_success() {
                break;
            }
        }
    }

    let state = if outcome.is_success() {
        tracing::info!(
            provider = attempted.last().map(String::as_str).unwrap_or(default),
            attempts = attempted.len(),
            "Message delivered"
        );
        FailoverState::Succeeded
    } else {
        tracing::warn!(
            attempted = ?attempted,
            status = outcome.status_code,
            "All providers failed"
        );
        FailoverState::Exhausted
    };

    Ok(FailoverReport {
        outcome,
        attempted,
        state,
    })
}

/// One provider call. Transport failures become a 502 outcome so the pass can
/// move on; every other error is returned as-is.
async fn attempt(
    registry: &ProviderRegistry,
    name: &str,
    payload: &MessagePayload,
) -> Result<DeliveryOutcome> {
    let provider = registry.resolve(name)?;
    tracing::debug!(provider = %name, "Attempting delivery");

    let outcome = match provider.send(payload).await {
        Ok(outcome) => outcome,
        Err(e) if e.is_transient() => {
            DeliveryOutcome::new(StatusCode::BAD_GATEWAY.as_u16(), e.to_string())
        }
        Err(e) => return Err(e),
    };

    if !outcome.is_success() {
        tracing::warn!(
            provider = %name,
            status = outcome.status_code,
            body = %outcome.body,
            "Provider failed"
        );
    }

    Ok(outcome)
}
