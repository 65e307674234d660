//! Notification ingest — POST /notifications
//!
//! Pipeline per request: validate → filter/canonicalize → append (durable,
//! delivered=0) → fanout to live channels. The append strictly precedes any
//! dispatch attempt, so a crash between the two leaves the record safely
//! recoverable by the next connection's drain.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::app::AppState;
use tipstream_core::normalize::{normalize, Outcome};
use tipstream_core::types::IngestEvent;

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub identifier: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    /// Originating application tag.
    pub source: Option<String>,
    /// Client timestamp in epoch milliseconds.
    pub timestamp: Option<i64>,
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum IngestResponse {
    /// Filtered out by the business rule — no state change.
    Ignored { reason: &'static str },
    /// Persisted (and best-effort dispatched); id of the durable record.
    Saved { id: String },
}

#[derive(Debug, Serialize)]
pub struct IngestError {
    pub error: String,
}

type Rejection = (StatusCode, Json<IngestError>);

fn reject(status: StatusCode, message: impl Into<String>) -> Rejection {
    (
        status,
        Json(IngestError {
            error: message.into(),
        }),
    )
}

/// POST /notifications — ingest one raw alert event.
pub async fn ingest_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IngestRequest>,
) -> Result<Json<IngestResponse>, Rejection> {
    // Required-field check: no identifier, no persistence.
    let identifier = match req.identifier.as_deref() {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => return Err(reject(StatusCode::BAD_REQUEST, "Missing identifier")),
    };

    // Cheap filter first: titles without the currency marker never touch
    // storage or the identity store.
    if !req.title.contains(tipstream_core::config::CURRENCY_MARKER) {
        return Ok(Json(IngestResponse::Ignored {
            reason: "title missing currency marker",
        }));
    }

    // Unknown identifier is a rejection with no persistence.
    let profile = state
        .identities
        .lookup(&identifier)
        .await
        .map_err(|e| {
            error!(identifier, error = %e, "identity lookup failed");
            reject(StatusCode::INTERNAL_SERVER_ERROR, "Storage failure")
        })?
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Identifier not found"))?;

    let event = IngestEvent {
        identifier: identifier.clone(),
        title: req.title,
        text: req.text,
        source: req.source,
        timestamp: req.timestamp,
    };
    let received_at_ms = chrono::Utc::now().timestamp_millis();

    let payload = match normalize(event, &profile, &state.config.assets, received_at_ms) {
        Outcome::Accepted(payload) => payload,
        // Unreachable given the marker pre-check, but normalize owns the rule.
        Outcome::Ignored => {
            return Ok(Json(IngestResponse::Ignored {
                reason: "title missing currency marker",
            }))
        }
    };

    // Durable append before any dispatch attempt; a storage failure here is
    // an ingest failure and nothing is sent.
    let record_id = state.queue.append(payload.clone()).await.map_err(|e| {
        error!(identifier, error = %e, "queue append failed");
        reject(StatusCode::INTERNAL_SERVER_ERROR, "Storage failure")
    })?;

    // Best-effort live fanout; zero successes just leaves the record queued.
    let delivered = tipstream_relay::fan_out(
        &state.registry,
        &state.queue,
        &identifier,
        &payload,
        &record_id,
    )
    .await;

    info!(identifier, record_id, delivered, "notification ingested");
    Ok(Json(IngestResponse::Saved { id: record_id }))
}
