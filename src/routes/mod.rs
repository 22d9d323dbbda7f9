pub mod health;
pub mod scores;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes())
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/score", post(scores::save_score))
        .route("/leaderboard", get(scores::get_leaderboard))
        .route("/scores/all", get(scores::get_all_scores))
}
