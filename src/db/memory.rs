use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ScoreStore, StoreError, LEADERBOARD_LIMIT, RECENT_LIMIT};
use crate::models::{ScoreRecord, ScoreSubmission};

/// Process-local score store for local play and tests
#[derive(Default)]
pub struct MemoryScoreStore {
    records: RwLock<Vec<ScoreRecord>>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Insert an already-built record, keeping its id and date
    pub async fn insert(&self, record: ScoreRecord) {
        self.records.write().await.push(record);
    }
}

#[async_trait]
impl ScoreStore for MemoryScoreStore {
    async fn append(&self, submission: ScoreSubmission) -> Result<ScoreRecord, StoreError> {
        let record = ScoreRecord::new(submission);
        self.insert(record.clone()).await;
        tracing::info!(
            "New record: {} - {}s - won: {}",
            record.player,
            record.time,
            record.won
        );
        Ok(record)
    }

    async fn leaderboard(&self) -> Result<Vec<ScoreRecord>, StoreError> {
        let records = self.records.read().await;
        let mut winners: Vec<ScoreRecord> = records.iter().filter(|r| r.won).cloned().collect();
        winners.sort_by(|a, b| a.time.cmp(&b.time).then(a.date.cmp(&b.date)));
        winners.truncate(LEADERBOARD_LIMIT as usize);
        Ok(winners)
    }

    async fn recent(&self) -> Result<Vec<ScoreRecord>, StoreError> {
        let records = self.records.read().await;
        let mut recent = records.clone();
        recent.sort_by(|a, b| b.date.cmp(&a.date));
        recent.truncate(RECENT_LIMIT as usize);
        Ok(recent)
    }
}
