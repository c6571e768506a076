//! Historical score records.

use chrono::NaiveDate;
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::scoring::{PlayerResult, results_for, score_for};
use crate::games::tictactoe::{Game, GameId, Outcome, PlayerId, Symbol};

/// Immutable record of one finished game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct Score {
    id: i32,
    game_id: GameId,
    player1: PlayerId,
    player2: PlayerId,
    player1_symbol: Symbol,
    player2_symbol: Symbol,
    winner: Outcome,
    player1_points: i32,
    player2_points: i32,
    number_of_moves: i32,
    completed_on: NaiveDate,
}

impl Score {
    /// True if `player` took part in the game.
    pub fn involves(&self, player: PlayerId) -> bool {
        self.player1 == player || self.player2 == player
    }
}

/// A score ready to be stored, built at the moment a game finishes.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct NewScore {
    game_id: GameId,
    player1: PlayerId,
    player2: PlayerId,
    player1_symbol: Symbol,
    player2_symbol: Symbol,
    winner: Outcome,
    player1_points: i32,
    player2_points: i32,
    number_of_moves: i32,
    completed_on: NaiveDate,
}

impl NewScore {
    /// Scores `game`, which finished with `outcome`.
    #[instrument(skip(game), fields(game_id = game.id()))]
    pub fn for_game(game: &Game, outcome: Outcome, completed_on: NaiveDate) -> Self {
        let points = score_for(outcome, game.player1_symbol());
        Self {
            game_id: game.id(),
            player1: game.player1(),
            player2: game.player2(),
            player1_symbol: game.player1_symbol(),
            player2_symbol: game.player2_symbol(),
            winner: outcome,
            player1_points: points.player1,
            player2_points: points.player2,
            // A game never exceeds nine moves.
            number_of_moves: game.number_of_moves() as i32,
            completed_on,
        }
    }

    /// Ranking updates this score implies, one per player.
    pub fn results(&self) -> [(PlayerId, PlayerResult); 2] {
        let (first, second) = results_for(self.winner, self.player1_symbol);
        [(self.player1, first), (self.player2, second)]
    }

    /// Attaches the storage id.
    pub fn into_score(self, id: i32) -> Score {
        Score {
            id,
            game_id: self.game_id,
            player1: self.player1,
            player2: self.player2,
            player1_symbol: self.player1_symbol,
            player2_symbol: self.player2_symbol,
            winner: self.winner,
            player1_points: self.player1_points,
            player2_points: self.player2_points,
            number_of_moves: self.number_of_moves,
            completed_on: self.completed_on,
        }
    }
}
