use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::{
    db::{ScoreStore, StoreError},
    models::{ScoreRecord, ScoreSubmission},
};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("score service unreachable: {0}")]
    Http(#[from] reqwest::Error),
    #[error("score service responded with {0}")]
    Status(StatusCode),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Where a finished run is sent, and where the leaderboard is read back from
#[async_trait]
pub trait ScoreReporter: Send + Sync {
    async fn save_score(&self, submission: ScoreSubmission) -> Result<(), ReportError>;

    async fn leaderboard(&self) -> Result<Vec<ScoreRecord>, ReportError>;
}

/// Reports straight into this server's own store
pub struct LocalReporter {
    store: Arc<dyn ScoreStore>,
}

impl LocalReporter {
    pub fn new(store: Arc<dyn ScoreStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ScoreReporter for LocalReporter {
    async fn save_score(&self, submission: ScoreSubmission) -> Result<(), ReportError> {
        self.store.append(submission).await?;
        Ok(())
    }

    async fn leaderboard(&self) -> Result<Vec<ScoreRecord>, ReportError> {
        Ok(self.store.leaderboard().await?)
    }
}

/// Talks to a score service over its HTTP API
pub struct HttpScoreClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpScoreClient {
    /// `base_url` is the service root, e.g. `http://localhost:5000`
    pub fn new(base_url: &str) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ScoreReporter for HttpScoreClient {
    async fn save_score(&self, submission: ScoreSubmission) -> Result<(), ReportError> {
        let response = self
            .client
            .post(format!("{}/api/score", self.base_url))
            .json(&submission)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ReportError::Status(response.status()));
        }
        Ok(())
    }

    async fn leaderboard(&self) -> Result<Vec<ScoreRecord>, ReportError> {
        let response = self
            .client
            .get(format!("{}/api/leaderboard", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ReportError::Status(response.status()));
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::MemoryScoreStore, test_support};

    fn winning_run(player: &str, time: i64) -> ScoreSubmission {
        ScoreSubmission {
            player: player.to_string(),
            time,
            difficulty: "HARD".to_string(),
            won: true,
        }
    }

    #[tokio::test]
    async fn test_local_reporter_round_trips_through_store() {
        let store = Arc::new(MemoryScoreStore::new());
        let reporter = LocalReporter::new(store.clone());

        reporter.save_score(winning_run("vex", 33)).await.unwrap();

        let board = reporter.leaderboard().await.unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].player, "vex");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_http_client_posts_to_score_service() {
        let store = Arc::new(MemoryScoreStore::new());
        let base_url = test_support::spawn_server(store.clone()).await;
        let client = HttpScoreClient::new(&base_url).unwrap();

        client.save_score(winning_run("kite", 21)).await.unwrap();
        client
            .save_score(ScoreSubmission {
                won: false,
                ..winning_run("kite", 4)
            })
            .await
            .unwrap();

        assert_eq!(store.len().await, 2);
        let board = client.leaderboard().await.unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].time, 21);
    }

    #[tokio::test]
    async fn test_http_client_reports_unreachable_service() {
        // Nothing listens on port 9 locally
        let client = HttpScoreClient::new("http://127.0.0.1:9").unwrap();
        let result = client.save_score(winning_run("ghost", 1)).await;
        assert!(matches!(result, Err(ReportError::Http(_))));
    }
}
