//! League operation errors.

use derive_more::{Display, Error};

use crate::db::{DbError, DbErrorKind};
use crate::games::tictactoe::{MoveError, Symbol};

/// Error returned by a [`LeagueService`](super::LeagueService) operation.
#[derive(Debug, Clone, Display, Error)]
pub enum LeagueError {
    /// Unknown user or game.
    #[display("{_0}")]
    NotFound(#[error(not(source))] String),
    /// Duplicate user name, or a write that lost every retry.
    #[display("{_0}")]
    Conflict(#[error(not(source))] String),
    /// Square index outside 0-8.
    #[display("That's an invalid move: {_0}")]
    InvalidSquare(#[error(not(source))] i32),
    /// Target square already marked.
    #[display("There is already an {occupant} in square {square}")]
    SquareOccupied {
        /// Target square.
        square: usize,
        /// Symbol already on the square.
        occupant: Symbol,
    },
    /// The symbol is not the one to move.
    #[display("It's not {_0}'s turn!")]
    WrongTurn(#[error(not(source))] Symbol),
    /// Missing or malformed request field.
    #[display("{_0}")]
    Validation(#[error(not(source))] String),
    /// Backend failure.
    #[display("{_0}")]
    Storage(DbError),
}

impl LeagueError {
    /// Unknown game.
    pub fn game_not_found() -> Self {
        Self::NotFound("Game not found!".to_string())
    }

    /// Unknown user.
    pub fn user_not_found() -> Self {
        Self::NotFound("A User with that name does not exist!".to_string())
    }
}

impl From<MoveError> for LeagueError {
    fn from(err: MoveError) -> Self {
        match err {
            MoveError::WrongTurn(symbol) => Self::WrongTurn(symbol),
            MoveError::InvalidSquare(square) => Self::InvalidSquare(square),
            MoveError::SquareOccupied { square, occupant } => {
                Self::SquareOccupied { square, occupant }
            }
        }
    }
}

impl From<DbError> for LeagueError {
    fn from(err: DbError) -> Self {
        match err.kind {
            DbErrorKind::NotFound => Self::NotFound(err.message),
            DbErrorKind::Conflict | DbErrorKind::Stale => Self::Conflict(err.message),
            DbErrorKind::Corrupt | DbErrorKind::Backend => Self::Storage(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_errors_keep_their_kind() {
        let err = LeagueError::from(MoveError::SquareOccupied {
            square: 0,
            occupant: Symbol::O,
        });
        assert_eq!(err.to_string(), "There is already an O in square 0");

        let err = LeagueError::from(MoveError::WrongTurn(Symbol::X));
        assert!(matches!(err, LeagueError::WrongTurn(Symbol::X)));
    }

    #[test]
    fn test_db_error_kinds_map_to_league_kinds() {
        let err = LeagueError::from(DbError::with_kind(DbErrorKind::Conflict, "taken"));
        assert!(matches!(err, LeagueError::Conflict(ref m) if m == "taken"));

        let err = LeagueError::from(DbError::stale("moved on"));
        assert!(matches!(err, LeagueError::Conflict(_)));

        let err = LeagueError::from(DbError::new("disk full"));
        assert!(matches!(err, LeagueError::Storage(_)));
    }
}
