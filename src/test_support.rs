use std::sync::Arc;

use axum::Router;
use dashmap::DashMap;

use crate::{
    build_router,
    config::{Config, DatabaseConfig, ScoresConfig, ServerConfig},
    db::ScoreStore,
    reporter::LocalReporter,
    AppState,
};

pub fn config() -> Config {
    Config {
        database: DatabaseConfig {
            url: "memory:".to_string(),
            max_connections: 1,
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            static_dir: "./frontend".to_string(),
        },
        scores: ScoresConfig { service_url: None },
    }
}

pub fn state(store: Arc<dyn ScoreStore>) -> Arc<AppState> {
    Arc::new(AppState {
        config: config(),
        scores: store.clone(),
        reporter: Arc::new(LocalReporter::new(store)),
        sessions: DashMap::new(),
    })
}

pub fn router(store: Arc<dyn ScoreStore>) -> Router {
    build_router(state(store))
}

/// Serve the full app on an ephemeral local port, returning its base URL
pub async fn spawn_server(store: Arc<dyn ScoreStore>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    let app = router(store);

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });

    format!("http://{}", addr)
}
