use serde::{Deserialize, Serialize};

use crate::game::{AudioFrame, Cue, Visibility};
use crate::models::{Difficulty, Direction, RunState, ScoreRecord};

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    StartRun {
        player: String,
        #[serde(default)]
        difficulty: Difficulty,
    },
    Move {
        direction: Direction,
    },
    FireSonar,
    SetMuted {
        muted: bool,
    },
    FetchLeaderboard,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Fog-resolved view of the maze after a change
    Frame {
        state: RunState,
        cells: Vec<Vec<Visibility>>,
        sonar_charges: u8,
        sonar_active: bool,
        elapsed: u32,
    },
    Audio {
        params: AudioFrame,
    },
    Cue {
        cue: Cue,
        frequencies: Vec<f32>,
    },
    RunEnded {
        won: bool,
        time: u32,
        difficulty: Difficulty,
    },
    Leaderboard {
        scores: Vec<ScoreRecord>,
    },
    Notice {
        message: String,
    },
    Error {
        message: String,
    },
}

impl ServerMessage {
    pub fn cue(cue: Cue) -> Self {
        ServerMessage::Cue {
            cue,
            frequencies: cue.frequencies().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_messages_parse() {
        let start: ClientMessage =
            serde_json::from_str(r#"{"type":"start_run","player":"echo","difficulty":"HARD"}"#)
                .unwrap();
        assert!(matches!(
            start,
            ClientMessage::StartRun { ref player, difficulty: Difficulty::Hard } if player == "echo"
        ));

        let mv: ClientMessage =
            serde_json::from_str(r#"{"type":"move","direction":"left"}"#).unwrap();
        assert!(matches!(mv, ClientMessage::Move { direction: Direction::Left }));

        let sonar: ClientMessage = serde_json::from_str(r#"{"type":"fire_sonar"}"#).unwrap();
        assert!(matches!(sonar, ClientMessage::FireSonar));
    }

    #[test]
    fn test_start_run_defaults_to_medium() {
        let start: ClientMessage =
            serde_json::from_str(r#"{"type":"start_run","player":"echo"}"#).unwrap();
        assert!(matches!(
            start,
            ClientMessage::StartRun { difficulty: Difficulty::Medium, .. }
        ));
    }

    #[test]
    fn test_run_ended_wire_format() {
        let json = serde_json::to_value(ServerMessage::RunEnded {
            won: true,
            time: 12,
            difficulty: Difficulty::Easy,
        })
        .unwrap();
        assert_eq!(json["type"], "run_ended");
        assert_eq!(json["difficulty"], "EASY");
    }
}
