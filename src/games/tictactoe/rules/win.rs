//! Win detection logic for tic-tac-toe.

use super::super::{Board, Cell, Symbol};
use tracing::instrument;

/// The eight winning index triples.
pub const LINES: [[usize; 3]; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// Checks if `symbol` holds all three squares of any line.
#[instrument(skip(board))]
pub fn has_line(board: &Board, symbol: Symbol) -> bool {
    let squares = board.squares();
    LINES
        .iter()
        .any(|line| line.iter().all(|&i| squares[i] == Cell::Occupied(symbol)))
}
