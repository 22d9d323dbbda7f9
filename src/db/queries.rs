use sqlx::{PgPool, Result};

use crate::models::ScoreRecord;

// Score queries
pub async fn insert_score(pool: &PgPool, record: &ScoreRecord) -> Result<ScoreRecord> {
    let saved = sqlx::query_as::<_, ScoreRecord>(
        r#"
        INSERT INTO scores (id, player, time, difficulty, won, date)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(record.id)
    .bind(&record.player)
    .bind(record.time)
    .bind(&record.difficulty)
    .bind(record.won)
    .bind(record.date)
    .fetch_one(pool)
    .await?;

    tracing::info!(
        "New record: {} - {}s - won: {}",
        saved.player,
        saved.time,
        saved.won
    );

    Ok(saved)
}

/// Fastest winning runs first
pub async fn get_leaderboard(pool: &PgPool, limit: i64) -> Result<Vec<ScoreRecord>> {
    sqlx::query_as::<_, ScoreRecord>(
        r#"
        SELECT * FROM scores
        WHERE won = TRUE
        ORDER BY time ASC, date ASC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn get_recent_scores(pool: &PgPool, limit: i64) -> Result<Vec<ScoreRecord>> {
    sqlx::query_as::<_, ScoreRecord>("SELECT * FROM scores ORDER BY date DESC LIMIT $1")
        .bind(limit)
        .fetch_all(pool)
        .await
}
