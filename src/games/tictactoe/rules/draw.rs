//! Draw detection logic for tic-tac-toe.

use super::super::{Board, Cell};
use tracing::instrument;

/// Checks if the board is full (all squares occupied).
///
/// A full board with no winner indicates a draw.
#[instrument(skip(board))]
pub fn is_full(board: &Board) -> bool {
    board.squares().iter().all(|s| *s != Cell::Empty)
}

#[cfg(test)]
mod tests {
    use super::super::super::Symbol;
    use super::*;

    #[test]
    fn test_empty_board_not_full() {
        assert!(!is_full(&Board::new()));
    }

    #[test]
    fn test_partial_board_not_full() {
        let mut board = Board::new();
        board.set(4, Symbol::X).unwrap();
        assert!(!is_full(&board));
    }

    #[test]
    fn test_full_board() {
        let mut board = Board::new();
        for sq in 0..9 {
            let symbol = if sq % 2 == 0 { Symbol::X } else { Symbol::O };
            board.set(sq, symbol).unwrap();
        }
        assert!(is_full(&board));
    }
}
