use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::{
    models::{ScoreRecord, ScoreSubmission},
    AppState,
};

#[derive(Debug, Serialize)]
pub struct SavedResponse {
    pub message: &'static str,
}

/// Generic failure body; the cause is only logged
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self)).into_response()
    }
}

/// Append one run outcome. A body that is not a JSON object is saved as an
/// all-defaults run.
pub async fn save_score(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<SavedResponse>), ApiError> {
    let payload = serde_json::from_slice::<ScoreSubmission>(&body).unwrap_or_else(|e| {
        tracing::warn!("Unreadable score body, saving defaults: {}", e);
        ScoreSubmission::default()
    });

    state.scores.append(payload).await.map_err(|e| {
        tracing::error!("Failed to save score: {}", e);
        ApiError {
            error: "Failed to save score",
        }
    })?;

    Ok((
        StatusCode::CREATED,
        Json(SavedResponse {
            message: "Score Saved",
        }),
    ))
}

/// Winners only, fastest first
pub async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ScoreRecord>>, ApiError> {
    let scores = state.scores.leaderboard().await.map_err(|e| {
        tracing::error!("Failed to fetch leaderboard: {}", e);
        ApiError {
            error: "Failed to fetch leaderboard",
        }
    })?;
    Ok(Json(scores))
}

/// Debug listing of the most recent runs
pub async fn get_all_scores(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ScoreRecord>>, ApiError> {
    let scores = state.scores.recent().await.map_err(|e| {
        tracing::error!("Failed to fetch scores: {}", e);
        ApiError {
            error: "Failed to fetch scores",
        }
    })?;
    Ok(Json(scores))
}
