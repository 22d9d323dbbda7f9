use rand::Rng;

use crate::models::{Cell, Grid, Level, Position};

/// Chance that any given cell starts out as a wall
pub const WALL_PROBABILITY: f64 = 0.2;

pub const PLAYER_SPAWN: Position = Position::new(1, 1);
pub const PURSUER_SPAWN: Position = Position::new(8, 8);

/// Cells forced open around the player spawn
const PLAYER_CLEARING: [Position; 5] = [
    Position::new(1, 1),
    Position::new(1, 2),
    Position::new(2, 1),
    Position::new(0, 1),
    Position::new(1, 0),
];

/// Cells forced open around the pursuer spawn
const PURSUER_CLEARING: [Position; 3] = [
    Position::new(8, 8),
    Position::new(7, 8),
    Position::new(8, 7),
];

/// First row and column of the 3x3 block the exit is drawn from
const EXIT_REGION_ORIGIN: usize = 7;
const EXIT_REGION_SPAN: usize = 3;

pub struct LevelGenerator;

impl LevelGenerator {
    /// Generate a new 10x10 level with randomly scattered walls
    pub fn generate() -> Level {
        let mut rng = rand::rng();
        Self::generate_with(&mut rng)
    }

    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Level {
        let mut grid = Grid::open();

        for pos in Grid::positions() {
            if rng.random_bool(WALL_PROBABILITY) {
                grid.set(pos, Cell::Wall);
            }
        }

        Self::clear_spawns(&mut grid);

        let exit = Position::new(
            EXIT_REGION_ORIGIN + rng.random_range(0..EXIT_REGION_SPAN),
            EXIT_REGION_ORIGIN + rng.random_range(0..EXIT_REGION_SPAN),
        );

        let level = Self::with_exit(grid, exit);
        tracing::debug!(
            "Generated level with {} walls, exit at {:?}",
            level.grid.count(Cell::Wall),
            level.exit
        );
        level
    }

    /// Place the exit on `grid`, carving the cells above and to the left of it
    /// so it can be approached from the interior.
    ///
    /// No path from the player spawn to the exit is guaranteed.
    pub fn with_exit(mut grid: Grid, exit: Position) -> Level {
        grid.set(exit, Cell::Exit);

        if exit.row > 0 {
            grid.set(Position::new(exit.row - 1, exit.col), Cell::Floor);
        }
        if exit.col > 0 {
            grid.set(Position::new(exit.row, exit.col - 1), Cell::Floor);
        }

        Level { grid, exit }
    }

    fn clear_spawns(grid: &mut Grid) {
        for pos in PLAYER_CLEARING.iter().chain(PURSUER_CLEARING.iter()) {
            grid.set(*pos, Cell::Floor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_player_clearing_never_walled() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let level = LevelGenerator::generate_with(&mut rng);
            for pos in PLAYER_CLEARING {
                assert!(
                    level.grid.is_open(pos),
                    "player clearing cell {:?} should never be a wall",
                    pos
                );
            }
            for pos in PURSUER_CLEARING {
                assert!(level.grid.is_open(pos));
            }
        }
    }

    #[test]
    fn test_exactly_one_exit_in_far_corner() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let level = LevelGenerator::generate_with(&mut rng);
            assert_eq!(level.grid.count(Cell::Exit), 1);
            assert_eq!(level.grid.get(level.exit), Some(Cell::Exit));
            assert!((7..=9).contains(&level.exit.row));
            assert!((7..=9).contains(&level.exit.col));
        }
    }

    #[test]
    fn test_exit_neighbours_carved() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..500 {
            let level = LevelGenerator::generate_with(&mut rng);
            let above = Position::new(level.exit.row - 1, level.exit.col);
            let left = Position::new(level.exit.row, level.exit.col - 1);
            assert!(level.grid.is_open(above));
            assert!(level.grid.is_open(left));
        }
    }

    #[test]
    fn test_with_exit_carves_toward_interior() {
        let mut grid = Grid::open();
        grid.set(Position::new(7, 7), Cell::Wall);
        grid.set(Position::new(8, 6), Cell::Wall);

        let level = LevelGenerator::with_exit(grid, Position::new(8, 7));

        assert_eq!(level.exit, Position::new(8, 7));
        assert_eq!(level.grid.get(Position::new(8, 7)), Some(Cell::Exit));
        assert_eq!(level.grid.get(Position::new(7, 7)), Some(Cell::Floor));
        assert_eq!(level.grid.get(Position::new(8, 6)), Some(Cell::Floor));
    }

    #[test]
    fn test_wall_density_is_roughly_one_in_five() {
        let mut rng = StdRng::seed_from_u64(11);
        let levels = 200;
        let walls: usize = (0..levels)
            .map(|_| LevelGenerator::generate_with(&mut rng).grid.count(Cell::Wall))
            .sum();
        let average = walls as f64 / levels as f64;
        // 100 cells at 0.2, minus the forced clearings
        assert!(average > 14.0 && average < 22.0, "average walls {}", average);
    }
}
