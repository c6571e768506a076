//! Tic-tac-toe ladder library - two-player games, score history and rankings
//!
//! # Architecture
//!
//! - **Games**: board, rules and the game state machine
//! - **Ranking**: point awards, score records and per-player rankings
//! - **Db**: storage traits with SQLite and in-memory implementations
//! - **League**: the user-facing operations built on the above
//! - **Server**: axum REST routes over the league
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tictactoe_ladder::{LeagueService, MemoryRepository, Symbol};
//!
//! # fn example() -> Result<(), tictactoe_ladder::LeagueError> {
//! let league = LeagueService::new(Arc::new(MemoryRepository::new()), Duration::from_secs(60));
//! league.create_user("alice", None)?;
//! league.create_user("bob", None)?;
//!
//! let game = league.new_game("alice", Some("bob"), None)?;
//! let game = league.make_move(game.id, Symbol::X, 4)?;
//! println!("{}", game.message);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod db;
mod games;
mod league;
mod ranking;
mod server;

// Crate-level exports - Configuration
pub use config::{ConfigError, LeagueConfig};

// Crate-level exports - Persistence
pub use db::{
    DbError, DbErrorKind, GameStore, MIGRATIONS, MemoryRepository, MoveCommit, NewUser,
    RankingStore, Repository, ScoreStore, SqliteRepository, User, UserRegistry,
};

// Crate-level exports - Game types (tic-tac-toe)
pub use games::tictactoe::{
    Board, BoardError, CancelOutcome, Cell, Game, GameId, GameStatus, HistoryEntry, MoveError,
    MoveOutcome, Outcome, PlayerId, ReplayError, SQUARES, Symbol, rules,
};

// Crate-level exports - Scoring and rankings
pub use ranking::{
    DRAW_POINTS, LOSS_POINTS, NewScore, PlayerRanking, PlayerResult, Points, Score, WIN_POINTS,
    results_for, score_for,
};

// Crate-level exports - League service
pub use league::{
    GameSnapshot, HistoryView, LeagueError, LeagueService, MAX_COMMIT_ATTEMPTS, MessageView,
    MovesRemainingCache, RankingSnapshot, Reminder, ScoreSnapshot, average_moves_remaining,
    format_average,
};

// Crate-level exports - HTTP server
pub use server::{ApiError, CreateUserRequest, MakeMoveRequest, NewGameRequest, router};
