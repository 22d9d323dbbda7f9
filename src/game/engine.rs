use thiserror::Error;

use super::{
    grid::{PLAYER_SPAWN, PURSUER_SPAWN},
    pursuer,
    sonar::Sonar,
    visibility::{FogView, Visibility},
};
use crate::models::{Difficulty, Direction, Grid, Level, Position, RunState, ScoreSubmission};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("a player name is required to start a run")]
    NameRequired,
    #[error("a run is already in progress")]
    AlreadyPlaying,
}

/// Final outcome of a run, produced exactly once when it ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub player: String,
    pub elapsed_secs: u32,
    pub difficulty: Difficulty,
    pub won: bool,
}

impl From<RunSummary> for ScoreSubmission {
    fn from(summary: RunSummary) -> Self {
        ScoreSubmission {
            player: summary.player,
            time: i64::from(summary.elapsed_secs),
            difficulty: summary.difficulty.as_str().to_string(),
            won: summary.won,
        }
    }
}

/// Result of a single player input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveOutcome {
    /// The player actually changed cell
    pub moved: bool,
    /// Set when this move ended the run
    pub ended: Option<RunSummary>,
}

/// State of one encounter: the maze, who is where, and how the run stands.
///
/// Every mutation is a no-op unless the run is `Playing`.
#[derive(Debug, Clone)]
pub struct Engine {
    state: RunState,
    player_name: String,
    difficulty: Difficulty,
    level: Level,
    player: Position,
    pursuer: Position,
    sonar: Sonar,
    elapsed_secs: u32,
    /// One-shot latch guarding the terminal transitions
    finished: bool,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            state: RunState::Start,
            player_name: String::new(),
            difficulty: Difficulty::default(),
            level: Level {
                grid: Grid::open(),
                exit: PURSUER_SPAWN,
            },
            player: PLAYER_SPAWN,
            pursuer: PURSUER_SPAWN,
            sonar: Sonar::new(),
            elapsed_secs: 0,
            finished: false,
        }
    }

    /// Start a fresh run on `level`, replacing whatever came before.
    pub fn begin(
        &mut self,
        player_name: &str,
        difficulty: Difficulty,
        level: Level,
    ) -> Result<(), EngineError> {
        if self.state == RunState::Playing {
            return Err(EngineError::AlreadyPlaying);
        }
        let player_name = player_name.trim();
        if player_name.is_empty() {
            return Err(EngineError::NameRequired);
        }

        *self = Self {
            state: RunState::Playing,
            player_name: player_name.to_string(),
            difficulty,
            level,
            ..Self::new()
        };

        tracing::debug!(
            "Run started for {} on {:?}, exit at {:?}",
            self.player_name,
            self.difficulty,
            self.level.exit
        );

        Ok(())
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == RunState::Playing
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn player(&self) -> Position {
        self.player
    }

    pub fn pursuer(&self) -> Position {
        self.pursuer
    }

    pub fn exit(&self) -> Position {
        self.level.exit
    }

    pub fn sonar(&self) -> &Sonar {
        &self.sonar
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    /// Manhattan distances from the player to the pursuer and to the exit
    pub fn distances(&self) -> (usize, usize) {
        (
            self.player.distance(&self.pursuer),
            self.player.distance(&self.level.exit),
        )
    }

    pub fn move_player(&mut self, direction: Direction) -> MoveOutcome {
        if !self.is_playing() {
            return MoveOutcome::default();
        }

        let Some(target) = self.player.step(direction) else {
            return MoveOutcome::default();
        };
        if !self.level.grid.is_open(target) {
            return MoveOutcome::default();
        }

        self.player = target;

        // Reaching the exit takes precedence over landing on the pursuer
        let ended = if self.player == self.level.exit {
            self.finish(true)
        } else {
            self.check_collision()
        };

        MoveOutcome { moved: true, ended }
    }

    /// One pursuer tick
    pub fn advance_pursuer(&mut self) -> Option<RunSummary> {
        if !self.is_playing() {
            return None;
        }
        self.pursuer = pursuer::next_position(&self.level.grid, self.pursuer, self.player);
        self.check_collision()
    }

    /// One second of survival
    pub fn tick_clock(&mut self) {
        if self.is_playing() {
            self.elapsed_secs += 1;
        }
    }

    pub fn fire_sonar(&mut self) -> bool {
        self.is_playing() && self.sonar.fire()
    }

    pub fn recharge_sonar(&mut self) {
        if self.is_playing() {
            self.sonar.recharge();
        }
    }

    pub fn clear_sonar(&mut self) {
        self.sonar.clear_boost();
    }

    pub fn visibility(&self) -> Vec<Vec<Visibility>> {
        self.fog().resolve_all()
    }

    pub fn fog(&self) -> FogView<'_> {
        FogView {
            grid: &self.level.grid,
            player: self.player,
            pursuer: self.pursuer,
            sonar_active: self.sonar.is_active(),
        }
    }

    fn check_collision(&mut self) -> Option<RunSummary> {
        if self.player == self.pursuer {
            self.finish(false)
        } else {
            None
        }
    }

    fn finish(&mut self, won: bool) -> Option<RunSummary> {
        if self.finished {
            return None;
        }
        self.finished = true;
        self.state = if won { RunState::Won } else { RunState::GameOver };
        self.sonar.clear_boost();

        tracing::info!(
            "Run ended for {}: won={} after {}s on {:?}",
            self.player_name,
            won,
            self.elapsed_secs,
            self.difficulty
        );

        Some(RunSummary {
            player: self.player_name.clone(),
            elapsed_secs: self.elapsed_secs,
            difficulty: self.difficulty,
            won,
        })
    }

    #[cfg(test)]
    pub(crate) fn place(&mut self, player: Position, pursuer: Position) {
        self.player = player;
        self.pursuer = pursuer;
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
