//! Point awards for a finished game.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::games::tictactoe::{Outcome, Symbol};

/// Points for a win.
pub const WIN_POINTS: i32 = 3;
/// Points for a draw.
pub const DRAW_POINTS: i32 = 1;
/// Points for a loss.
pub const LOSS_POINTS: i32 = 0;

/// A finished game from one player's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum PlayerResult {
    /// Player completed a line.
    Win,
    /// Opponent completed a line.
    Loss,
    /// Board filled without a line.
    Draw,
}

impl PlayerResult {
    /// Points awarded for this result.
    pub fn points(self) -> i32 {
        match self {
            Self::Win => WIN_POINTS,
            Self::Loss => LOSS_POINTS,
            Self::Draw => DRAW_POINTS,
        }
    }
}

/// Points awarded to each player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Points {
    /// Player 1's award.
    pub player1: i32,
    /// Player 2's award.
    pub player2: i32,
}

/// Each player's result: one win and one loss, or two draws.
#[instrument]
pub fn results_for(outcome: Outcome, player1_symbol: Symbol) -> (PlayerResult, PlayerResult) {
    match outcome {
        Outcome::Draw => (PlayerResult::Draw, PlayerResult::Draw),
        Outcome::Won(winner) if winner == player1_symbol => {
            (PlayerResult::Win, PlayerResult::Loss)
        }
        Outcome::Won(_) => (PlayerResult::Loss, PlayerResult::Win),
    }
}

/// Points for `(player1, player2)` given the outcome and player 1's symbol.
#[instrument]
pub fn score_for(outcome: Outcome, player1_symbol: Symbol) -> Points {
    let (first, second) = results_for(outcome, player1_symbol);
    Points {
        player1: first.points(),
        player2: second.points(),
    }
}
