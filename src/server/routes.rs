//! Route handlers.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::error::ApiError;
use crate::games::tictactoe::{GameId, Symbol};
use crate::league::{
    GameSnapshot, HistoryView, LeagueError, LeagueService, MessageView, RankingSnapshot,
    ScoreSnapshot,
};

/// Body of `POST /user`.
///
/// Absent fields deserialize to empty values and are rejected by the league
/// as validation errors.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    /// Unique player name.
    #[serde(default)]
    pub user_name: String,
    /// Address for reminders.
    #[serde(default)]
    pub email: Option<String>,
}

/// Body of `POST /game`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewGameRequest {
    /// Player who moves first.
    #[serde(default)]
    pub player1_name: String,
    /// Opponent.
    #[serde(default)]
    pub player2_name: Option<String>,
    /// `X` or `O`; X when absent.
    #[serde(default)]
    pub player1_symbol: Option<String>,
}

/// Body of `PUT /game/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct MakeMoveRequest {
    /// `X` or `O`.
    #[serde(default)]
    pub player_symbol: Option<String>,
    /// Square index, 0-8.
    #[serde(default)]
    pub square: Option<i32>,
}

fn required<T>(field: &str, value: Option<T>) -> Result<T, LeagueError> {
    value.ok_or_else(|| LeagueError::Validation(format!("{} is required", field)))
}

fn parse_symbol(field: &str, value: &str) -> Result<Symbol, LeagueError> {
    value
        .trim()
        .to_uppercase()
        .parse::<Symbol>()
        .map_err(|_| LeagueError::Validation(format!("{} must be X or O, got '{}'", field, value)))
}

/// Runs blocking league work off the async executor.
async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, LeagueError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::internal(format!("Worker failed: {}", e)))?
        .map_err(ApiError::from)
}

#[instrument(skip(league))]
pub(super) async fn create_user(
    State(league): State<LeagueService>,
    request: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<Json<MessageView>, ApiError> {
    let Json(request) = request?;
    blocking(move || league.create_user(&request.user_name, request.email.as_deref()))
        .await
        .map(Json)
}

#[instrument(skip(league))]
pub(super) async fn new_game(
    State(league): State<LeagueService>,
    request: Result<Json<NewGameRequest>, JsonRejection>,
) -> Result<Json<GameSnapshot>, ApiError> {
    let Json(request) = request?;
    blocking(move || {
        let symbol = request
            .player1_symbol
            .as_deref()
            .map(|s| parse_symbol("player1_symbol", s))
            .transpose()?;
        league.new_game(
            &request.player1_name,
            request.player2_name.as_deref(),
            symbol,
        )
    })
    .await
    .map(Json)
}

#[instrument(skip(league))]
pub(super) async fn get_game(
    State(league): State<LeagueService>,
    id: Result<Path<GameId>, PathRejection>,
) -> Result<Json<GameSnapshot>, ApiError> {
    let Path(id) = id?;
    blocking(move || league.get_game(id)).await.map(Json)
}

#[instrument(skip(league))]
pub(super) async fn make_move(
    State(league): State<LeagueService>,
    id: Result<Path<GameId>, PathRejection>,
    request: Result<Json<MakeMoveRequest>, JsonRejection>,
) -> Result<Json<GameSnapshot>, ApiError> {
    let Path(id) = id?;
    let Json(request) = request?;
    blocking(move || {
        let symbol = required("player_symbol", request.player_symbol)?;
        let symbol = parse_symbol("player_symbol", &symbol)?;
        let square = required("square", request.square)?;
        debug!(symbol = %symbol, square, "Move requested");
        league.make_move(id, symbol, square)
    })
    .await
    .map(Json)
}

#[instrument(skip(league))]
pub(super) async fn cancel_game(
    State(league): State<LeagueService>,
    id: Result<Path<GameId>, PathRejection>,
) -> Result<Json<MessageView>, ApiError> {
    let Path(id) = id?;
    blocking(move || league.cancel_game(id)).await.map(Json)
}

#[instrument(skip(league))]
pub(super) async fn user_games(
    State(league): State<LeagueService>,
    Path(name): Path<String>,
) -> Result<Json<Vec<GameSnapshot>>, ApiError> {
    blocking(move || league.list_games_for_user(&name))
        .await
        .map(Json)
}

#[instrument(skip(league))]
pub(super) async fn scores(
    State(league): State<LeagueService>,
) -> Result<Json<Vec<ScoreSnapshot>>, ApiError> {
    blocking(move || league.list_scores()).await.map(Json)
}

#[instrument(skip(league))]
pub(super) async fn user_scores(
    State(league): State<LeagueService>,
    Path(name): Path<String>,
) -> Result<Json<Vec<ScoreSnapshot>>, ApiError> {
    blocking(move || league.list_scores_for_user(&name))
        .await
        .map(Json)
}

#[instrument(skip(league))]
pub(super) async fn rankings(
    State(league): State<LeagueService>,
) -> Result<Json<Vec<RankingSnapshot>>, ApiError> {
    blocking(move || league.list_rankings()).await.map(Json)
}

#[instrument(skip(league))]
pub(super) async fn game_history(
    State(league): State<LeagueService>,
    id: Result<Path<GameId>, PathRejection>,
) -> Result<Json<HistoryView>, ApiError> {
    let Path(id) = id?;
    blocking(move || league.game_history(id)).await.map(Json)
}

#[instrument(skip(league))]
pub(super) async fn average_moves(
    State(league): State<LeagueService>,
) -> Result<Json<MessageView>, ApiError> {
    blocking(move || league.average_moves_remaining())
        .await
        .map(Json)
}
