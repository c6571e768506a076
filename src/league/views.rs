//! Serializable results of league operations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::games::tictactoe::{Game, GameId, GameStatus, HistoryEntry, Outcome, Symbol};
use crate::ranking::{PlayerRanking, Score};

/// Plain status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageView {
    /// Text shown to the caller.
    pub message: String,
}

impl MessageView {
    /// Wraps a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Current state of one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Game identifier.
    pub id: GameId,
    /// Name of player 1.
    pub player1_name: String,
    /// Symbol of player 1.
    pub player1_symbol: Symbol,
    /// Name of player 2.
    pub player2_name: String,
    /// Symbol of player 2.
    pub player2_symbol: Symbol,
    /// Moves played so far.
    pub number_of_moves: usize,
    /// One of `in_progress`, `won`, `draw` or `cancelled`.
    pub status: String,
    /// Winning symbol, once the game is won.
    pub winner: Option<Symbol>,
    /// True once no further moves are accepted.
    pub game_over: bool,
    /// Nine characters, row by row, with a space for an empty square.
    pub board: String,
    /// Status line for the caller.
    pub message: String,
}

impl GameSnapshot {
    /// Builds the snapshot of `game` between the two named players.
    pub fn new(game: &Game, player1_name: String, player2_name: String, message: String) -> Self {
        let (status, winner) = match game.status() {
            GameStatus::InProgress => ("in_progress", None),
            GameStatus::Won(symbol) => ("won", Some(symbol)),
            GameStatus::Draw => ("draw", None),
            GameStatus::Cancelled => ("cancelled", None),
        };
        Self {
            id: game.id(),
            player1_name,
            player1_symbol: game.player1_symbol(),
            player2_name,
            player2_symbol: game.player2_symbol(),
            number_of_moves: game.number_of_moves(),
            status: status.to_string(),
            winner,
            game_over: game.is_over(),
            board: game.board().to_compact(),
            message,
        }
    }
}

/// One historical score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    /// Game the score belongs to.
    pub game_id: GameId,
    /// Name of player 1.
    pub player1_name: String,
    /// Symbol of player 1.
    pub player1_symbol: Symbol,
    /// Name of player 2.
    pub player2_name: String,
    /// Symbol of player 2.
    pub player2_symbol: Symbol,
    /// `X`, `O` or `Draw`.
    pub winner: String,
    /// Points awarded to player 1.
    pub player1_points: i32,
    /// Points awarded to player 2.
    pub player2_points: i32,
    /// Moves the game took.
    pub number_of_moves: i32,
    /// Day the game finished.
    pub completed_on: NaiveDate,
}

impl ScoreSnapshot {
    /// Builds the snapshot of `score` between the two named players.
    pub fn new(score: &Score, player1_name: String, player2_name: String) -> Self {
        let winner = match score.winner() {
            Outcome::Won(symbol) => symbol.to_string(),
            Outcome::Draw => "Draw".to_string(),
        };
        Self {
            game_id: *score.game_id(),
            player1_name,
            player1_symbol: *score.player1_symbol(),
            player2_name,
            player2_symbol: *score.player2_symbol(),
            winner,
            player1_points: *score.player1_points(),
            player2_points: *score.player2_points(),
            number_of_moves: *score.number_of_moves(),
            completed_on: *score.completed_on(),
        }
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingSnapshot {
    /// Player name.
    pub player_name: String,
    /// Finished games.
    pub total_games: i32,
    /// Games won.
    pub wins: i32,
    /// Games drawn.
    pub draws: i32,
    /// Games lost.
    pub losses: i32,
    /// Average points per finished game.
    pub ranking: f64,
}

impl RankingSnapshot {
    /// Builds the row for `ranking`.
    pub fn new(ranking: &PlayerRanking, player_name: String) -> Self {
        Self {
            player_name,
            total_games: *ranking.total_games(),
            wins: *ranking.wins(),
            draws: *ranking.draws(),
            losses: ranking.losses(),
            ranking: *ranking.ranking(),
        }
    }
}

/// Moves of one game in play order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryView {
    /// Game identifier.
    pub game_id: GameId,
    /// Played moves.
    pub moves: Vec<HistoryEntry>,
    /// Board rendered as a 3x3 grid.
    pub board: String,
    /// Status line for the game.
    pub message: String,
}

/// Reminder owed to a player with unfinished games.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// Player name.
    pub user_name: String,
    /// Address to notify.
    pub email: String,
    /// Mail subject.
    pub subject: String,
    /// Mail body.
    pub body: String,
    /// In-progress games the player takes part in.
    pub game_ids: Vec<GameId>,
}

impl Reminder {
    /// Composes the reminder for `user_name`.
    pub fn new(user_name: String, email: String, game_ids: Vec<GameId>) -> Self {
        let body = format!(
            "Hello {}, Your tic-tac-toe game needs your attention!",
            user_name
        );
        Self {
            user_name,
            email,
            subject: "Reminder: You have a tic-tac-toe game in progress!".to_string(),
            body,
            game_ids,
        }
    }
}
