use crate::models::{Grid, Position};

/// Greedy one-cell step of the pursuer toward `target`.
///
/// The axis with the larger gap is tried first (columns win ties), falling
/// back to the other axis only when it also has a gap to close. Walls and the
/// grid edge block a step; the exit does not. When both are blocked the
/// pursuer stays put. There is no lookahead, so it can stall behind concave
/// walls indefinitely.
pub fn next_position(grid: &Grid, from: Position, target: Position) -> Position {
    let d_row = target.row as i64 - from.row as i64;
    let d_col = target.col as i64 - from.col as i64;

    let row_step = || shift(from, d_row.signum(), 0).filter(|p| grid.is_open(*p));
    let col_step = || shift(from, 0, d_col.signum()).filter(|p| grid.is_open(*p));

    let moved = if d_row.abs() > d_col.abs() {
        row_step().or_else(|| if d_col != 0 { col_step() } else { None })
    } else if d_col != 0 {
        col_step().or_else(|| if d_row != 0 { row_step() } else { None })
    } else {
        None
    };

    moved.unwrap_or(from)
}

fn shift(pos: Position, d_row: i64, d_col: i64) -> Option<Position> {
    let row = usize::try_from(pos.row as i64 + d_row).ok()?;
    let col = usize::try_from(pos.col as i64 + d_col).ok()?;
    Some(Position::new(row, col))
}
