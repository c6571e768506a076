//! Cumulative per-player ranking.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::scoring::{DRAW_POINTS, PlayerResult, WIN_POINTS};
use crate::games::tictactoe::PlayerId;

/// Win/draw/loss totals for one player and the ranking derived from them.
///
/// `ranking` is `(wins * 3 + draws) / total_games`, or `0.0` before the
/// first finished game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct PlayerRanking {
    player: PlayerId,
    total_games: i32,
    wins: i32,
    draws: i32,
    ranking: f64,
}

impl PlayerRanking {
    /// A fresh ranking with no games played.
    #[instrument]
    pub fn new(player: PlayerId) -> Self {
        Self::from_counts(player, 0, 0, 0)
    }

    /// Rebuilds a ranking from stored counts, recomputing the ranking value.
    pub fn from_counts(player: PlayerId, total_games: i32, wins: i32, draws: i32) -> Self {
        let mut ranking = Self {
            player,
            total_games,
            wins,
            draws,
            ranking: 0.0,
        };
        ranking.ranking = ranking.recompute();
        ranking
    }

    /// Games lost (`total_games - wins - draws`).
    pub fn losses(&self) -> i32 {
        self.total_games - self.wins - self.draws
    }

    /// Counts a won game.
    pub fn record_win(&mut self) {
        self.total_games += 1;
        self.wins += 1;
        self.ranking = self.recompute();
    }

    /// Counts a drawn game.
    pub fn record_draw(&mut self) {
        self.total_games += 1;
        self.draws += 1;
        self.ranking = self.recompute();
    }

    /// Counts a lost game.
    pub fn record_loss(&mut self) {
        self.total_games += 1;
        self.ranking = self.recompute();
    }

    /// Counts one finished game.
    #[instrument(skip(self), fields(player = self.player))]
    pub fn record(&mut self, result: PlayerResult) {
        match result {
            PlayerResult::Win => self.record_win(),
            PlayerResult::Loss => self.record_loss(),
            PlayerResult::Draw => self.record_draw(),
        }
        debug!(
            total_games = self.total_games,
            ranking = self.ranking,
            "Ranking updated"
        );
    }

    /// Ranking value for the current counts.
    pub fn recompute(&self) -> f64 {
        if self.total_games == 0 {
            0.0
        } else {
            f64::from(self.wins * WIN_POINTS + self.draws * DRAW_POINTS)
                / f64::from(self.total_games)
        }
    }
}
