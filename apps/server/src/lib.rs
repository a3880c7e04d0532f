//! Presence and call-signaling server for the language-exchange chat
//! platform.
//!
//! Tracks which users are online over persistent WebSocket connections,
//! relays WebRTC call envelopes between the right sockets (including every
//! tab or device of a user), and synchronizes shared conversation countdown
//! timers between two peers. Nothing here is persisted; all state lives in
//! the in-memory connection registry and dies with the process.

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod presence;
pub mod registry;
pub mod signaling;
pub mod state;
pub mod timer;
pub mod ws;

use state::AppState;

/// Builds the application router: the WebSocket gateway plus a health probe.
/// The platform's browser clients connect cross-origin, hence the permissive
/// CORS layer.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ws", get(ws::ws_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
