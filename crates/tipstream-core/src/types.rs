use serde::{Deserialize, Serialize};

/// Raw ingest event as received at POST /notifications, after the
/// required-identifier check has passed.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestEvent {
    pub identifier: String,
    pub title: String,
    pub text: String,
    /// Originating application tag (the original "packageName" field).
    pub source: Option<String>,
    /// Client timestamp in epoch milliseconds; receipt time when absent.
    pub timestamp: Option<i64>,
}

/// Canonical payload — the exact object persisted with the queue record and
/// pushed to every live channel as a JSON text frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertPayload {
    pub identifier: String,
    pub title: String,
    pub text: String,
    pub source: Option<String>,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub alert_gif: String,
    pub alert_audio: String,
}

/// One row of the durable notification queue.
///
/// `delivered_at` is `Some` iff `delivered` is true; `mark_delivered` is the
/// only transition and it fires at most once per record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: String,
    pub identifier: String,
    pub payload: AlertPayload,
    pub delivered: bool,
    pub created_at: String,
    pub delivered_at: Option<String>,
}

/// Viewer identity as issued by the external authorization flow.
/// Read-only to the relay core; only the asset overrides influence delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityProfile {
    pub identifier: String,
    pub provider: Option<String>,
    pub provider_id: Option<String>,
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    /// Optional per-identity alert-asset overrides.
    pub alert_gif: Option<String>,
    pub alert_audio: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}
