use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;

use crate::models::{ScoreRecord, ScoreSubmission};

pub mod memory;
pub mod queries;

pub use memory::MemoryScoreStore;

/// Winning runs shown on the leaderboard
pub const LEADERBOARD_LIMIT: i64 = 10;
/// Records returned by the unfiltered debug listing
pub const RECENT_LIMIT: i64 = 50;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Append-only collection of run outcomes
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Persist one run outcome
    async fn append(&self, submission: ScoreSubmission) -> Result<ScoreRecord, StoreError>;

    /// Winning runs only, fastest first, at most [`LEADERBOARD_LIMIT`]
    async fn leaderboard(&self) -> Result<Vec<ScoreRecord>, StoreError>;

    /// Every run, newest first, at most [`RECENT_LIMIT`]
    async fn recent(&self) -> Result<Vec<ScoreRecord>, StoreError>;
}

/// Build a pool that connects on first use, so a database that is down at
/// startup only fails the requests that need it.
pub fn create_pool(database_url: &str, max_connections: u32) -> sqlx::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect_lazy(database_url)
}

pub struct PgScoreStore {
    pool: PgPool,
}

impl PgScoreStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `scores` table if needed. Failures are logged and left for
    /// the routes to surface.
    pub async fn migrate(&self) {
        match sqlx::migrate!("./migrations").run(&self.pool).await {
            Ok(()) => tracing::info!("Database migrations completed"),
            Err(e) => tracing::error!("Database migrations failed: {}", e),
        }
    }
}

#[async_trait]
impl ScoreStore for PgScoreStore {
    async fn append(&self, submission: ScoreSubmission) -> Result<ScoreRecord, StoreError> {
        Ok(queries::insert_score(&self.pool, &ScoreRecord::new(submission)).await?)
    }

    async fn leaderboard(&self) -> Result<Vec<ScoreRecord>, StoreError> {
        Ok(queries::get_leaderboard(&self.pool, LEADERBOARD_LIMIT).await?)
    }

    async fn recent(&self) -> Result<Vec<ScoreRecord>, StoreError> {
        Ok(queries::get_recent_scores(&self.pool, RECENT_LIMIT).await?)
    }
}

/// Pick the store named by `database_url`: `memory:` keeps scores in process,
/// anything else is treated as a Postgres URL.
pub async fn open_store(
    database_url: &str,
    max_connections: u32,
) -> sqlx::Result<Arc<dyn ScoreStore>> {
    if database_url.starts_with("memory:") {
        tracing::warn!("Using in-memory score store; scores will not survive a restart");
        return Ok(Arc::new(MemoryScoreStore::new()));
    }

    let store = PgScoreStore::new(create_pool(database_url, max_connections)?);
    store.migrate().await;
    Ok(Arc::new(store))
}
