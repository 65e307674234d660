use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tipstream_core::config::TipstreamConfig;
use tipstream_relay::ConnectionRegistry;

use crate::store::{IdentityHandle, QueueHandle};

/// Central shared state — passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: TipstreamConfig,
    pub identities: IdentityHandle,
    pub queue: QueueHandle,
    pub registry: ConnectionRegistry,
}

impl AppState {
    pub fn new(config: TipstreamConfig, identities: IdentityHandle, queue: QueueHandle) -> Self {
        Self {
            config,
            identities,
            queue,
            registry: ConnectionRegistry::new(),
        }
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route("/notifications", post(crate::http::ingest::ingest_handler))
        .route("/alerts/{identifier}", get(crate::ws::connection::ws_handler))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
