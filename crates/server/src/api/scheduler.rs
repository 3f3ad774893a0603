//! Scheduler API handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

use buildsync_core::{RescanRequest, SchedulerStatus};

use crate::state::AppState;

/// Simple message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct SchedulerErrorResponse {
    pub error: String,
}

/// Get scheduler status, including the last pass report
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<SchedulerStatus> {
    Json(state.scheduler().status().await)
}

/// Queue a manual rescan
pub async fn rescan(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let message = match state.scheduler().request_rescan() {
        RescanRequest::Queued => "Rescan queued",
        RescanRequest::AlreadyQueued => "Rescan already queued",
        RescanRequest::NotRunning => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(SchedulerErrorResponse {
                    error: "Scheduler is not running".to_string(),
                }),
            )
                .into_response();
        }
    };

    (
        StatusCode::ACCEPTED,
        Json(MessageResponse {
            message: message.to_string(),
        }),
    )
        .into_response()
}
