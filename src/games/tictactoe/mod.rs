//! Tic-tac-toe rules engine: board, rules and game lifecycle.

mod error;
mod game;
pub mod rules;
mod types;

pub use error::{BoardError, MoveError, ReplayError};
pub use game::{CancelOutcome, Game, GameId, GameStatus, HistoryEntry, MoveOutcome, PlayerId};
pub use types::{Board, Cell, Outcome, SQUARES, Symbol};
