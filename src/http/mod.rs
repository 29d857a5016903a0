//! HTTP API for browser hosts
//!
//! This module exposes read-along views over REST:
//! - POST /readalong - Open a view
//! - POST /readalong/:view_id/load - Point the view at a testimony
//! - GET /readalong/:view_id - Current render tokens and status
//! - POST /readalong/:view_id/playback - Playback clock tick
//! - POST /readalong/:view_id/scroll - Manual scroll input
//! - POST /readalong/:view_id/seek - Token/segment click
//! - DELETE /readalong/:view_id - Close the view
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::{AppState, ViewEntry};
