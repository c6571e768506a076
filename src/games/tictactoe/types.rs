//! Core domain types for tic-tac-toe.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::error::BoardError;
use super::rules;

/// Number of squares on the board.
pub const SQUARES: usize = 9;

/// The mark a player is assigned for a game.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
pub enum Symbol {
    /// Crosses.
    X,
    /// Noughts.
    O,
}

impl Symbol {
    /// Returns the other symbol.
    pub fn opponent(self) -> Self {
        match self {
            Symbol::X => Symbol::O,
            Symbol::O => Symbol::X,
        }
    }

    /// Character used in the compact board string.
    pub fn as_char(self) -> char {
        match self {
            Symbol::X => 'X',
            Symbol::O => 'O',
        }
    }
}

/// A square on the tic-tac-toe board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Empty square.
    Empty,
    /// Square marked by a symbol.
    Occupied(Symbol),
}

impl Cell {
    /// Character used in the compact board string (`' '` when empty).
    pub fn as_char(self) -> char {
        match self {
            Cell::Empty => ' ',
            Cell::Occupied(symbol) => symbol.as_char(),
        }
    }
}

/// How a finished, non-cancelled game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Outcome {
    /// Three in a row for the given symbol.
    #[display("{_0}")]
    Won(Symbol),
    /// Board filled without a line.
    #[display("Draw")]
    Draw,
}

impl std::str::FromStr for Outcome {
    type Err = strum::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Draw" => Ok(Outcome::Draw),
            other => other.parse::<Symbol>().map(Outcome::Won),
        }
    }
}

/// 3x3 tic-tac-toe board, squares in row-major order (0-8).
///
/// Squares are only ever written once: [`Board::set`] refuses to overwrite
/// an occupied square.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    squares: [Cell; SQUARES],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self {
            squares: [Cell::Empty; SQUARES],
        }
    }

    /// Gets the cell at the given square.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::OutOfRange`] if `square` is not in 0-8.
    pub fn get(&self, square: usize) -> Result<Cell, BoardError> {
        self.squares
            .get(square)
            .copied()
            .ok_or(BoardError::OutOfRange(square))
    }

    /// Marks an empty square with `symbol`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::OutOfRange`] for a bad index and
    /// [`BoardError::IllegalMove`] if the square is already occupied.
    #[instrument(skip(self))]
    pub fn set(&mut self, square: usize, symbol: Symbol) -> Result<(), BoardError> {
        match self.get(square)? {
            Cell::Empty => {
                self.squares[square] = Cell::Occupied(symbol);
                Ok(())
            }
            Cell::Occupied(occupant) => Err(BoardError::IllegalMove { square, occupant }),
        }
    }

    /// Returns true if any winning line is entirely `symbol`.
    pub fn has_line(&self, symbol: Symbol) -> bool {
        rules::has_line(self, symbol)
    }

    /// Returns true if no empty square remains.
    pub fn is_full(&self) -> bool {
        rules::is_full(self)
    }

    /// Returns all squares as a slice.
    pub fn squares(&self) -> &[Cell; SQUARES] {
        &self.squares
    }

    /// Nine-character representation, `' '` for empty squares.
    pub fn to_compact(&self) -> String {
        self.squares.iter().map(|c| c.as_char()).collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in 0..3 {
            let [a, b, c] = [0, 1, 2].map(|col| self.squares[row * 3 + col].as_char());
            writeln!(f, " {a} | {b} | {c}")?;
            if row < 2 {
                writeln!(f, "---+---+---")?;
            }
        }
        Ok(())
    }
}
