//! League operations: users, games, moves, scores and rankings.

mod error;
mod service;
mod stats;
mod views;

pub use error::LeagueError;
pub use service::{LeagueService, MAX_COMMIT_ATTEMPTS};
pub use stats::{MovesRemainingCache, average_moves_remaining, format_average};
pub use views::{GameSnapshot, HistoryView, MessageView, RankingSnapshot, Reminder, ScoreSnapshot};
