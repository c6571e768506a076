//! Game lifecycle state machine for tic-tac-toe.
//!
//! A [`Game`] starts `InProgress` on an empty board and leaves it exactly
//! once: on a completed line, on the ninth move, or on cancellation. The
//! symbol to move is never stored; it is derived from the move count, so
//! turn order cannot drift from the board.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::error::{BoardError, MoveError, ReplayError};
use super::types::{Board, Outcome, SQUARES, Symbol};

/// Identifier of a stored game.
pub type GameId = i32;

/// Opaque identifier of a registered player.
pub type PlayerId = i32;

/// Lifecycle status of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// Moves are accepted.
    InProgress,
    /// The symbol completed a line.
    Won(Symbol),
    /// All nine squares filled without a line.
    Draw,
    /// Abandoned before completion. Produces no score.
    Cancelled,
}

impl GameStatus {
    /// Returns true for `Won`, `Draw` and `Cancelled`.
    pub fn is_terminal(self) -> bool {
        self != GameStatus::InProgress
    }

    /// The scored outcome, if the game finished by play.
    pub fn outcome(self) -> Option<Outcome> {
        match self {
            GameStatus::Won(symbol) => Some(Outcome::Won(symbol)),
            GameStatus::Draw => Some(Outcome::Draw),
            GameStatus::InProgress | GameStatus::Cancelled => None,
        }
    }
}

impl From<Outcome> for GameStatus {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Won(symbol) => GameStatus::Won(symbol),
            Outcome::Draw => GameStatus::Draw,
        }
    }
}

/// Result of a move request that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The game had already ended; nothing changed.
    AlreadyOver,
    /// Move applied; `next` is to move.
    Continue {
        /// Symbol whose turn it is now.
        next: Symbol,
    },
    /// Move applied and completed a line.
    Won(Symbol),
    /// Move applied and filled the board.
    Draw,
}

impl MoveOutcome {
    /// The outcome to score, when this move ended the game.
    pub fn finished(self) -> Option<Outcome> {
        match self {
            MoveOutcome::Won(symbol) => Some(Outcome::Won(symbol)),
            MoveOutcome::Draw => Some(Outcome::Draw),
            MoveOutcome::AlreadyOver | MoveOutcome::Continue { .. } => None,
        }
    }

    /// Human-readable status line for the caller.
    pub fn message(self) -> String {
        match self {
            MoveOutcome::AlreadyOver => "Game already over!".to_string(),
            MoveOutcome::Continue { next } => {
                format!("Move accepted. Time for '{next}' to make a move!")
            }
            MoveOutcome::Won(symbol) => format!("'{symbol}' wins the game!"),
            MoveOutcome::Draw => "The game ended in a draw.".to_string(),
        }
    }
}

/// Result of a cancellation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The game moved to `Cancelled`.
    Cancelled,
    /// The game was already terminal; nothing changed.
    AlreadyEnded,
}

impl CancelOutcome {
    /// Human-readable status line for the caller.
    pub fn message(self) -> &'static str {
        match self {
            CancelOutcome::Cancelled => "The game has been cancelled.",
            CancelOutcome::AlreadyEnded => "This game has already ended.",
        }
    }
}

/// One played move, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// 1-based position in play order.
    pub move_number: usize,
    /// Square played (0-8).
    pub square: usize,
    /// Symbol that played it.
    pub symbol: Symbol,
}

/// A two-player game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    id: GameId,
    player1: PlayerId,
    player2: PlayerId,
    player1_symbol: Symbol,
    board: Board,
    moves: Vec<usize>,
    status: GameStatus,
}

impl Game {
    /// Creates a new game in progress. `player1_symbol` moves first.
    #[instrument]
    pub fn new(id: GameId, player1: PlayerId, player2: PlayerId, player1_symbol: Symbol) -> Self {
        Self {
            id,
            player1,
            player2,
            player1_symbol,
            board: Board::new(),
            moves: Vec::new(),
            status: GameStatus::InProgress,
        }
    }

    /// Rebuilds a game by playing `moves` in order from an empty board.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError`] if a square is off the board, repeated, or
    /// played after the game ended.
    #[instrument(skip(moves), fields(moves = moves.len()))]
    pub fn replay(
        id: GameId,
        player1: PlayerId,
        player2: PlayerId,
        player1_symbol: Symbol,
        moves: &[usize],
    ) -> Result<Self, ReplayError> {
        let mut game = Self::new(id, player1, player2, player1_symbol);
        for &square in moves {
            if game.status.is_terminal() {
                return Err(ReplayError::MoveAfterEnd(square));
            }
            let symbol = game.symbol_to_move();
            game.place(symbol, square)?;
        }
        Ok(game)
    }

    /// Game identifier.
    pub fn id(&self) -> GameId {
        self.id
    }

    /// First player (moves on even move counts).
    pub fn player1(&self) -> PlayerId {
        self.player1
    }

    /// Second player.
    pub fn player2(&self) -> PlayerId {
        self.player2
    }

    /// Symbol assigned to player 1.
    pub fn player1_symbol(&self) -> Symbol {
        self.player1_symbol
    }

    /// Symbol assigned to player 2.
    pub fn player2_symbol(&self) -> Symbol {
        self.player1_symbol.opponent()
    }

    /// The board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Squares played, in order.
    pub fn moves(&self) -> &[usize] {
        &self.moves
    }

    /// Number of moves played (0-9).
    pub fn number_of_moves(&self) -> usize {
        self.moves.len()
    }

    /// Moves left before the board is full.
    pub fn moves_remaining(&self) -> usize {
        SQUARES - self.moves.len()
    }

    /// Lifecycle status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// True once the game has left `InProgress`.
    pub fn is_over(&self) -> bool {
        self.status.is_terminal()
    }

    /// The scored outcome, if the game finished by play.
    pub fn outcome(&self) -> Option<Outcome> {
        self.status.outcome()
    }

    /// True if `player` is one of the two participants.
    pub fn involves(&self, player: PlayerId) -> bool {
        self.player1 == player || self.player2 == player
    }

    /// Symbol whose turn it is: player 1 on even move counts, player 2 on odd.
    pub fn symbol_to_move(&self) -> Symbol {
        self.symbol_at(self.moves.len())
    }

    fn symbol_at(&self, move_index: usize) -> Symbol {
        if move_index % 2 == 0 {
            self.player1_symbol
        } else {
            self.player2_symbol()
        }
    }

    /// Validates and applies a move by `symbol` on `square`.
    ///
    /// A move on a terminal game is a no-op reported as
    /// [`MoveOutcome::AlreadyOver`].
    ///
    /// # Errors
    ///
    /// Checked in order: [`MoveError::WrongTurn`], [`MoveError::InvalidSquare`],
    /// [`MoveError::SquareOccupied`]. A rejected move leaves the game unchanged.
    #[instrument(skip(self), fields(game_id = self.id, moves = self.moves.len()))]
    pub fn apply_move(&mut self, symbol: Symbol, square: i32) -> Result<MoveOutcome, MoveError> {
        if self.status.is_terminal() {
            debug!(status = ?self.status, "Move on finished game ignored");
            return Ok(MoveOutcome::AlreadyOver);
        }

        let expected = self.symbol_to_move();
        if symbol != expected {
            debug!(expected = %expected, "Move out of turn");
            return Err(MoveError::WrongTurn(symbol));
        }

        let index = usize::try_from(square).map_err(|_| MoveError::InvalidSquare(square))?;
        self.place(symbol, index).map_err(|e| match e {
            BoardError::OutOfRange(_) => MoveError::InvalidSquare(square),
            BoardError::IllegalMove { square, occupant } => {
                MoveError::SquareOccupied { square, occupant }
            }
        })
    }

    /// Marks the board and advances the status. Turn is not checked here.
    fn place(&mut self, symbol: Symbol, square: usize) -> Result<MoveOutcome, BoardError> {
        self.board.set(square, symbol)?;
        self.moves.push(square);

        let outcome = if self.board.has_line(symbol) {
            self.status = GameStatus::Won(symbol);
            MoveOutcome::Won(symbol)
        } else if self.moves.len() == SQUARES {
            self.status = GameStatus::Draw;
            MoveOutcome::Draw
        } else {
            MoveOutcome::Continue {
                next: self.symbol_to_move(),
            }
        };

        if self.status.is_terminal() {
            info!(
                game_id = self.id,
                status = ?self.status,
                moves = self.moves.len(),
                "Game finished"
            );
        }
        Ok(outcome)
    }

    /// Cancels an in-progress game. Cancelling a terminal game is a no-op.
    #[instrument(skip(self), fields(game_id = self.id))]
    pub fn cancel(&mut self) -> CancelOutcome {
        if self.status.is_terminal() {
            debug!(status = ?self.status, "Cancel on finished game ignored");
            return CancelOutcome::AlreadyEnded;
        }
        self.status = GameStatus::Cancelled;
        info!("Game cancelled");
        CancelOutcome::Cancelled
    }

    /// Played moves with the symbol that made each one.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.moves
            .iter()
            .enumerate()
            .map(|(i, &square)| HistoryEntry {
                move_number: i + 1,
                square,
                symbol: self.symbol_at(i),
            })
            .collect()
    }

    /// Status line shown when the game is fetched.
    pub fn status_message(&self) -> String {
        match self.status {
            GameStatus::InProgress => {
                format!("Time for '{}' to make a move!", self.symbol_to_move())
            }
            GameStatus::Won(_) | GameStatus::Draw => "This game has ended.".to_string(),
            GameStatus::Cancelled => "This game has been cancelled.".to_string(),
        }
    }
}
