use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Side length of the square maze
pub const GRID_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Label used on the wire and in stored scores
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
        }
    }

    /// How often the pursuer takes a step
    pub fn pursuer_interval(self) -> Duration {
        match self {
            Difficulty::Easy => Duration::from_millis(1200),
            Difficulty::Medium => Duration::from_millis(900),
            Difficulty::Hard => Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    Start,
    Playing,
    GameOver,
    Won,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Cell {
    Floor,
    Wall,
    Exit,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, Eq, PartialEq)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn distance(&self, other: &Position) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// The neighbouring position in `direction`, or `None` when it would
    /// leave the grid.
    pub fn step(self, direction: Direction) -> Option<Position> {
        let (row, col) = match direction {
            Direction::Up => (self.row.checked_sub(1)?, self.col),
            Direction::Down => (self.row + 1, self.col),
            Direction::Left => (self.row, self.col.checked_sub(1)?),
            Direction::Right => (self.row, self.col + 1),
        };
        (row < GRID_SIZE && col < GRID_SIZE).then_some(Position { row, col })
    }
}

/// Row-major N x N maze
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Cell>,
}

impl Grid {
    /// A grid with no walls and no exit
    pub fn open() -> Self {
        Self {
            cells: vec![Cell::Floor; GRID_SIZE * GRID_SIZE],
        }
    }

    pub fn get(&self, pos: Position) -> Option<Cell> {
        if pos.row >= GRID_SIZE || pos.col >= GRID_SIZE {
            return None;
        }
        Some(self.cells[pos.row * GRID_SIZE + pos.col])
    }

    pub fn set(&mut self, pos: Position, cell: Cell) {
        if pos.row < GRID_SIZE && pos.col < GRID_SIZE {
            self.cells[pos.row * GRID_SIZE + pos.col] = cell;
        }
    }

    /// In bounds and not a wall
    pub fn is_open(&self, pos: Position) -> bool {
        matches!(self.get(pos), Some(Cell::Floor | Cell::Exit))
    }

    pub fn positions() -> impl Iterator<Item = Position> {
        (0..GRID_SIZE).flat_map(|row| (0..GRID_SIZE).map(move |col| Position { row, col }))
    }

    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|c| **c == cell).count()
    }
}

/// A generated maze together with its exit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    pub grid: Grid,
    pub exit: Position,
}
