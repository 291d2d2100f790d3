use axum::{
    routing::{get, patch},
    Router,
};

use crate::handlers::live_handlers;
use crate::state::AppState;

// REST glue around the live records, nested under /api.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events/:id/stream", get(live_handlers::get_event_stream))
        .route("/events/:id/stats", get(live_handlers::get_event_stats))
        .route(
            "/streams",
            get(live_handlers::get_streams).post(live_handlers::create_stream),
        )
        .route("/streams/:id", patch(live_handlers::update_stream))
}

// The live subscription endpoint, mounted at the server root.
pub fn ws_routes() -> Router<AppState> {
    Router::new().route("/ws", get(live_handlers::ws_upgrade))
}
