//! Board and move errors.

use derive_more::{Display, Error};

use super::Symbol;

/// Error raised by direct board access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum BoardError {
    /// Square index outside 0-8.
    #[display("Square {_0} is off the board")]
    OutOfRange(#[error(not(source))] usize),
    /// Square already holds a mark.
    #[display("Square {square} is already occupied by {occupant}")]
    IllegalMove {
        /// Target square.
        square: usize,
        /// Symbol already on the square.
        occupant: Symbol,
    },
}

/// Error that rejects a move without changing the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum MoveError {
    /// The symbol is not the one whose turn it is.
    #[display("It's not {_0}'s turn!")]
    WrongTurn(#[error(not(source))] Symbol),
    /// Square index outside 0-8.
    #[display("That's an invalid move: {_0}")]
    InvalidSquare(#[error(not(source))] i32),
    /// The square already holds a mark.
    #[display("There is already an {occupant} in square {square}")]
    SquareOccupied {
        /// Target square.
        square: usize,
        /// Symbol already on the square.
        occupant: Symbol,
    },
}

/// Error rebuilding a game from a stored move list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error, derive_more::From)]
pub enum ReplayError {
    /// A stored square was off the board or repeated.
    #[display("Invalid stored move: {_0}")]
    Board(BoardError),
    /// A move was stored after the game had already ended.
    #[display("Stored move {_0} follows the end of the game")]
    #[from(ignore)]
    MoveAfterEnd(#[error(not(source))] usize),
}
