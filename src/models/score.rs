use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::Difficulty;

/// Body of `POST /api/score`. Missing or `null` fields fall back to their
/// defaults and mistyped ones are coerced; nothing is rejected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScoreSubmission {
    #[serde(deserialize_with = "coerce::string")]
    pub player: String,
    #[serde(deserialize_with = "coerce::integer")]
    pub time: i64,
    /// Stored verbatim, so unknown labels survive
    #[serde(deserialize_with = "coerce::string_or_default_difficulty")]
    pub difficulty: String,
    #[serde(deserialize_with = "coerce::boolean")]
    pub won: bool,
}

impl Default for ScoreSubmission {
    fn default() -> Self {
        Self {
            player: String::new(),
            time: 0,
            difficulty: Difficulty::default().as_str().to_string(),
            won: false,
        }
    }
}

/// A persisted run outcome
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct ScoreRecord {
    pub id: Uuid,
    #[serde(deserialize_with = "coerce::string")]
    pub player: String,
    #[serde(deserialize_with = "coerce::integer")]
    pub time: i64,
    #[serde(deserialize_with = "coerce::string")]
    pub difficulty: String,
    #[serde(deserialize_with = "coerce::boolean")]
    pub won: bool,
    pub date: DateTime<Utc>,
}

impl ScoreRecord {
    pub fn new(submission: ScoreSubmission) -> Self {
        Self {
            id: Uuid::new_v4(),
            player: submission.player,
            time: submission.time,
            difficulty: submission.difficulty,
            won: submission.won,
            date: Utc::now(),
        }
    }
}

/// Loose JSON field readers for score bodies
mod coerce {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use crate::models::Difficulty;

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Null => String::new(),
            Value::String(s) => s,
            other => other.to_string(),
        })
    }

    pub fn string_or_default_difficulty<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<String, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Null => Difficulty::default().as_str().to_string(),
            Value::String(s) => s,
            other => other.to_string(),
        })
    }

    /// Whole seconds; fractions round to the nearest second
    pub fn integer<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f.round() as i64))
                .unwrap_or_default(),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map(|f| f.round() as i64)
                .unwrap_or_default(),
            Value::Bool(b) => i64::from(b),
            _ => 0,
        })
    }

    pub fn boolean<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Bool(b) => b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            Value::String(s) => matches!(s.trim(), "true" | "1" | "yes"),
            _ => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(body: serde_json::Value) -> ScoreSubmission {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_missing_and_null_fields_take_defaults() {
        let empty = parse(json!({}));
        assert_eq!(empty, ScoreSubmission::default());
        assert_eq!(empty.difficulty, "MEDIUM");

        let nulls = parse(json!({ "player": null, "time": null, "difficulty": null, "won": null }));
        assert_eq!(nulls, ScoreSubmission::default());
    }

    #[test]
    fn test_difficulty_kept_verbatim() {
        assert_eq!(parse(json!({ "difficulty": "hard" })).difficulty, "hard");
        assert_eq!(parse(json!({ "difficulty": "NIGHTMARE" })).difficulty, "NIGHTMARE");
    }

    #[test]
    fn test_time_coerced_to_whole_seconds() {
        assert_eq!(parse(json!({ "time": 12.5 })).time, 13);
        assert_eq!(parse(json!({ "time": 12.4 })).time, 12);
        assert_eq!(parse(json!({ "time": "31" })).time, 31);
        assert_eq!(parse(json!({ "time": "soon" })).time, 0);
    }

    #[test]
    fn test_loose_scalars_coerced() {
        let submission = parse(json!({ "player": 7, "won": "true" }));
        assert_eq!(submission.player, "7");
        assert!(submission.won);
        assert!(parse(json!({ "won": 1 })).won);
        assert!(!parse(json!({ "won": "no" })).won);
    }
}
