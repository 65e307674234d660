use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::app::AppState;

/// GET /health — liveness probe, returns server metadata plus the live
/// per-identifier connection counts.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let counts = state.registry.connection_counts();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "active_connections": counts,
    }))
}
