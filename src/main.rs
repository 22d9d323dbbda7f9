mod config;
mod db;
mod game;
mod models;
mod reporter;
mod routes;
mod websocket;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use anyhow::Result;
use axum::{routing::get, Router};
use chrono::{DateTime, Utc};
use config::Config;
use dashmap::DashMap;
use db::ScoreStore;
use reporter::{HttpScoreClient, LocalReporter, ScoreReporter};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// A connected game client
#[derive(Debug, Clone)]
pub struct ActiveSession {
    pub connected_at: DateTime<Utc>,
}

impl ActiveSession {
    pub fn new() -> Self {
        Self {
            connected_at: Utc::now(),
        }
    }
}

/// Application state shared across all handlers
pub struct AppState {
    pub config: Config,
    /// Durable run outcomes behind the score routes
    pub scores: Arc<dyn ScoreStore>,
    /// Where game sessions send finished runs
    pub reporter: Arc<dyn ScoreReporter>,
    /// Connected game sessions keyed by session id
    pub sessions: DashMap<Uuid, ActiveSession>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dark_signal=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Dark Signal server...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Open the score store; an unreachable database only fails score requests
    let scores = db::open_store(config.database_url(), config.database.max_connections).await?;
    tracing::info!("Score store ready");

    let reporter: Arc<dyn ScoreReporter> = match &config.scores.service_url {
        Some(url) => {
            tracing::info!("Reporting runs to score service at {}", url);
            Arc::new(HttpScoreClient::new(url)?)
        }
        None => Arc::new(LocalReporter::new(scores.clone())),
    };

    // Create application state
    let state = Arc::new(AppState {
        config: config.clone(),
        scores,
        reporter,
        sessions: DashMap::new(),
    });

    let app = build_router(state);

    // Start server
    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("WebSocket endpoint: ws://{}/ws", addr);
    tracing::info!("Leaderboard: http://{}/api/leaderboard", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Serve the browser client
    let frontend_service = ServeDir::new(&state.config.server.static_dir);

    Router::new()
        // WebSocket endpoint
        .route("/ws", get(websocket::handle_websocket))
        // API routes
        .merge(routes::create_routes())
        .fallback_service(frontend_service)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_session_records_connect_time() {
        let before = Utc::now();
        let session = ActiveSession::new();
        assert!(session.connected_at >= before);
    }

    async fn active_sessions(base_url: &str) -> u64 {
        let health: serde_json::Value = reqwest::get(format!("{}/health", base_url))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        health["active_sessions"].as_u64().unwrap()
    }

    #[tokio::test]
    async fn test_websocket_connection_is_tracked_until_close() {
        use futures::StreamExt;

        let base_url = test_support::spawn_server(Arc::new(db::MemoryScoreStore::new())).await;
        let ws_url = format!("{}/ws", base_url.replacen("http", "ws", 1));
        let (mut socket, _) = tokio_tungstenite::connect_async(ws_url).await.unwrap();

        // Each new session opens with the current leaderboard
        let first = socket.next().await.unwrap().unwrap();
        assert!(first.to_text().unwrap().contains("\"leaderboard\""));
        assert_eq!(active_sessions(&base_url).await, 1);

        socket.close(None).await.unwrap();
        let mut remaining = 1;
        for _ in 0..50 {
            remaining = active_sessions(&base_url).await;
            if remaining == 0 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn test_fallback_serves_client_from_static_dir() {
        use axum::{body::Body, http::Request};
        use tower::ServiceExt;

        let dir = std::env::temp_dir().join(format!("dark-signal-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("index.html"), "<canvas></canvas>").unwrap();

        let store: Arc<dyn ScoreStore> = Arc::new(db::MemoryScoreStore::new());
        let mut config = test_support::config();
        config.server.static_dir = dir.to_string_lossy().into_owned();
        let state = Arc::new(AppState {
            config,
            scores: store.clone(),
            reporter: Arc::new(LocalReporter::new(store)),
            sessions: DashMap::new(),
        });

        let response = build_router(state)
            .oneshot(Request::builder().uri("/index.html").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
