pub mod game;
pub mod score;

pub use game::{
    // Maze types
    Cell, Grid, Level, Position, GRID_SIZE,
    // Run types
    Difficulty, Direction, RunState,
};
pub use score::{ScoreRecord, ScoreSubmission};
