use super::state::AppState;
use crate::playback::{PlaybackSignal, ScrollCommand, ScrollInput};
use crate::session::ReadAlongSession;
use crate::transcript::TokenId;
use crate::view::ViewSnapshot;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateViewResponse {
    pub view_id: String,
    pub snapshot: ViewSnapshot,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadRequest {
    pub content_id: u64,

    /// Media duration, if the host already knows it
    pub known_duration_seconds: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackResponse {
    pub snapshot: ViewSnapshot,
    pub scroll: Option<ScrollCommand>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationRequest {
    pub duration_seconds: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeekRequest {
    /// Explicit time (segment click or scrubber)
    pub time_seconds: Option<f64>,

    /// Clicked token
    pub token: Option<TokenId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeekResponse {
    /// Time for the player to jump to; absent when the request was rejected
    pub seek_to: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ScrollRequest {
    pub input: ScrollInput,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn not_found(view_id: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("View {} not found", view_id),
        }),
    )
        .into_response()
}

fn session_failed(view_id: &str, e: anyhow::Error) -> Response {
    error!("Read-along session {} failed: {:#}", view_id, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: format!("View {} is no longer available", view_id),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /readalong
/// Open a new read-along view
pub async fn create_view(State(state): State<AppState>) -> impl IntoResponse {
    let handle = ReadAlongSession::spawn(Arc::clone(&state.source), state.session_config.clone());
    let view_id = handle.view_id().to_string();
    let snapshot = handle.snapshot();

    state.insert(view_id.clone(), handle).await;

    info!("Opened read-along view {}", view_id);

    (
        StatusCode::CREATED,
        Json(CreateViewResponse { view_id, snapshot }),
    )
}

/// GET /readalong/:view_id
/// Current view state
pub async fn get_view(State(state): State<AppState>, Path(view_id): Path<String>) -> Response {
    match state.session(&view_id).await {
        Some(handle) => (StatusCode::OK, Json(handle.snapshot())).into_response(),
        None => not_found(&view_id),
    }
}

/// DELETE /readalong/:view_id
/// Tear a view down (closes its stream, cancels pending fetches)
pub async fn close_view(State(state): State<AppState>, Path(view_id): Path<String>) -> Response {
    let Some(handle) = state.remove(&view_id).await else {
        return not_found(&view_id);
    };

    match handle.shutdown().await {
        Ok(()) => {
            info!("Closed read-along view {}", view_id);
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => session_failed(&view_id, e),
    }
}

/// POST /readalong/:view_id/load
/// Point the view at a testimony
pub async fn load_content(
    State(state): State<AppState>,
    Path(view_id): Path<String>,
    Json(req): Json<LoadRequest>,
) -> Response {
    let Some(handle) = state.session(&view_id).await else {
        return not_found(&view_id);
    };

    info!("View {} loading testimony {}", view_id, req.content_id);

    match handle.load(req.content_id, req.known_duration_seconds).await {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(e) => session_failed(&view_id, e),
    }
}

/// POST /readalong/:view_id/retry
/// Retry after a failed initial fetch
pub async fn retry(State(state): State<AppState>, Path(view_id): Path<String>) -> Response {
    let Some(handle) = state.session(&view_id).await else {
        return not_found(&view_id);
    };

    match handle.retry().await {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(e) => session_failed(&view_id, e),
    }
}

/// POST /readalong/:view_id/playback
/// Playback clock tick from the media player
pub async fn playback_tick(
    State(state): State<AppState>,
    Path(view_id): Path<String>,
    Json(signal): Json<PlaybackSignal>,
) -> Response {
    let Some(handle) = state.session(&view_id).await else {
        return not_found(&view_id);
    };

    match handle.tick(signal).await {
        Ok(scroll) => {
            let snapshot = handle.snapshot();
            (StatusCode::OK, Json(PlaybackResponse { snapshot, scroll })).into_response()
        }
        Err(e) => session_failed(&view_id, e),
    }
}

/// POST /readalong/:view_id/duration
/// Media duration reported by the player
pub async fn set_duration(
    State(state): State<AppState>,
    Path(view_id): Path<String>,
    Json(req): Json<DurationRequest>,
) -> Response {
    let Some(handle) = state.session(&view_id).await else {
        return not_found(&view_id);
    };

    match handle.set_media_duration(req.duration_seconds).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => session_failed(&view_id, e),
    }
}

/// POST /readalong/:view_id/seek
/// Token or segment click; returns the time the player should jump to
pub async fn seek(
    State(state): State<AppState>,
    Path(view_id): Path<String>,
    Json(req): Json<SeekRequest>,
) -> Response {
    let Some(handle) = state.session(&view_id).await else {
        return not_found(&view_id);
    };

    let result = match (req.token, req.time_seconds) {
        (Some(token), _) => handle.seek_to_token(token).await,
        (None, Some(time_seconds)) => handle.seek(time_seconds).await,
        (None, None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Either token or timeSeconds is required".to_string(),
                }),
            )
                .into_response();
        }
    };

    match result {
        Ok(seek_to) => (StatusCode::OK, Json(SeekResponse { seek_to })).into_response(),
        Err(e) => session_failed(&view_id, e),
    }
}

/// POST /readalong/:view_id/scroll
/// Manual scroll input on the transcript pane
pub async fn scroll_input(
    State(state): State<AppState>,
    Path(view_id): Path<String>,
    Json(req): Json<ScrollRequest>,
) -> Response {
    let Some(handle) = state.session(&view_id).await else {
        return not_found(&view_id);
    };

    match handle.scroll_input(req.input).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => session_failed(&view_id, e),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
