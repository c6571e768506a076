//! Scoring policy, immutable score records and the cumulative player ranking.

mod aggregate;
mod score;
mod scoring;

pub use aggregate::PlayerRanking;
pub use score::{NewScore, Score};
pub use scoring::{
    DRAW_POINTS, LOSS_POINTS, PlayerResult, Points, WIN_POINTS, results_for, score_for,
};
