//! REST transport over the league service.
//!
//! Handlers parse the request, hand the blocking league call to
//! `spawn_blocking` and return the snapshot as JSON. League errors become
//! `{"error": "..."}` bodies with a matching status code.

mod error;
mod routes;

pub use error::ApiError;
pub use routes::{CreateUserRequest, MakeMoveRequest, NewGameRequest};

use axum::Router;
use axum::routing::{delete, get, post};
use tracing::{info, instrument};

use crate::league::LeagueService;

/// Builds the application router.
#[instrument(skip(league))]
pub fn router(league: LeagueService) -> Router {
    info!("Building league router");
    Router::new()
        .route("/user", post(routes::create_user))
        .route("/game", post(routes::new_game))
        .route("/game/{id}", get(routes::get_game).put(routes::make_move))
        .route("/game/cancel/{id}", delete(routes::cancel_game))
        .route("/game/history/{id}", get(routes::game_history))
        .route("/games/user/{name}", get(routes::user_games))
        .route("/games/average_moves", get(routes::average_moves))
        .route("/scores", get(routes::scores))
        .route("/scores/user/{name}", get(routes::user_scores))
        .route("/scores/rankings", get(routes::rankings))
        .with_state(league)
}
