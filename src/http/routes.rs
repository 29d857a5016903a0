use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // View lifecycle
        .route("/readalong", post(handlers::create_view))
        .route(
            "/readalong/:view_id",
            get(handlers::get_view).delete(handlers::close_view),
        )
        .route("/readalong/:view_id/load", post(handlers::load_content))
        .route("/readalong/:view_id/retry", post(handlers::retry))
        // Playback collaborator
        .route("/readalong/:view_id/playback", post(handlers::playback_tick))
        .route("/readalong/:view_id/duration", post(handlers::set_duration))
        .route("/readalong/:view_id/seek", post(handlers::seek))
        // Transcript pane input
        .route("/readalong/:view_id/scroll", post(handlers::scroll_input))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        // Browser hosts call from another origin
        .layer(CorsLayer::permissive())
        .with_state(state)
}
