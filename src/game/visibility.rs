use serde::{Deserialize, Serialize};

use crate::models::{Cell, Grid, Position, GRID_SIZE};

/// Walls and the pursuer show up within this distance without sonar
const NEAR_SIGHT: usize = 2;
/// Floor is drawn dimmed within this distance
const DIM_SIGHT: usize = 3;
/// The exit glows through the fog within this distance
const EXIT_SIGHT: usize = 4;
/// Reach of a sonar pulse over plain floor
const SONAR_FLOOR_SIGHT: usize = 6;

/// How a single cell is presented to the player
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Player,
    Pursuer,
    Wall,
    Exit,
    Floor,
    Dim,
    Revealed,
    Hidden,
}

/// Everything fog resolution depends on for one frame
#[derive(Debug, Clone, Copy)]
pub struct FogView<'a> {
    pub grid: &'a Grid,
    pub player: Position,
    pub pursuer: Position,
    pub sonar_active: bool,
}

impl FogView<'_> {
    pub fn resolve(&self, pos: Position) -> Visibility {
        let Some(cell) = self.grid.get(pos) else {
            return Visibility::Hidden;
        };

        let dist = pos.distance(&self.player);

        if pos == self.player {
            return Visibility::Player;
        }

        if pos == self.pursuer && (self.sonar_active || dist < NEAR_SIGHT) {
            return Visibility::Pursuer;
        }

        match cell {
            Cell::Wall if self.sonar_active || dist < NEAR_SIGHT => Visibility::Wall,
            Cell::Exit if self.sonar_active || dist < EXIT_SIGHT => Visibility::Exit,
            Cell::Wall | Cell::Exit => Visibility::Hidden,
            Cell::Floor => {
                if dist == 0 {
                    Visibility::Floor
                } else if dist < DIM_SIGHT {
                    Visibility::Dim
                } else if self.sonar_active && dist < SONAR_FLOOR_SIGHT {
                    Visibility::Revealed
                } else {
                    Visibility::Hidden
                }
            }
        }
    }

    /// Resolve the whole grid, row by row
    pub fn resolve_all(&self) -> Vec<Vec<Visibility>> {
        (0..GRID_SIZE)
            .map(|row| {
                (0..GRID_SIZE)
                    .map(|col| self.resolve(Position::new(row, col)))
                    .collect()
            })
            .collect()
    }
}
