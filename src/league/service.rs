//! League business logic layer.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use tracing::{debug, info, instrument, warn};

use super::error::LeagueError;
use super::stats::{MovesRemainingCache, average_moves_remaining, format_average};
use super::views::{
    GameSnapshot, HistoryView, MessageView, RankingSnapshot, Reminder, ScoreSnapshot,
};
use crate::db::{DbErrorKind, MoveCommit, Repository, User};
use crate::games::tictactoe::{CancelOutcome, Game, GameId, MoveOutcome, PlayerId, Symbol};
use crate::ranking::NewScore;

/// Attempts made to commit a move before giving up on a contended game.
pub const MAX_COMMIT_ATTEMPTS: usize = 3;

/// Service layer behind every exposed league operation.
///
/// Wraps a [`Repository`] with name resolution, request validation, the
/// game rules and score finalization. Cloning is cheap and clones share the
/// store and the stats cache.
#[derive(Clone)]
pub struct LeagueService {
    repository: Arc<dyn Repository>,
    moves_remaining: Arc<MovesRemainingCache>,
}

impl std::fmt::Debug for LeagueService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeagueService")
            .field("moves_remaining", &self.moves_remaining)
            .finish_non_exhaustive()
    }
}

impl LeagueService {
    /// Creates a league service backed by the given repository.
    ///
    /// The average-moves figure is cached for `stats_ttl`.
    #[instrument(skip(repository))]
    pub fn new(repository: Arc<dyn Repository>, stats_ttl: Duration) -> Self {
        info!("Creating LeagueService");
        Self {
            repository,
            moves_remaining: Arc::new(MovesRemainingCache::new(stats_ttl)),
        }
    }

    /// Registers a user.
    ///
    /// # Errors
    ///
    /// [`LeagueError::Validation`] for an empty name,
    /// [`LeagueError::Conflict`] if the name is taken.
    #[instrument(skip(self, email))]
    pub fn create_user(&self, name: &str, email: Option<&str>) -> Result<MessageView, LeagueError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LeagueError::Validation("user_name is required".to_string()));
        }
        let email = email.map(str::trim).filter(|e| !e.is_empty());

        let user = self.repository.create_user(name, email).map_err(|e| {
            if e.kind == DbErrorKind::Conflict {
                LeagueError::Conflict("User name already exists!".to_string())
            } else {
                LeagueError::from(e)
            }
        })?;

        info!(user_id = user.id(), "User registered");
        Ok(MessageView::new(format!("User {} created!", user.name())))
    }

    /// Starts a game between two registered users.
    ///
    /// Player 1 takes `player1_symbol` (X when absent) and moves first.
    ///
    /// # Errors
    ///
    /// [`LeagueError::Validation`] for a missing or repeated name,
    /// [`LeagueError::NotFound`] for an unregistered one.
    #[instrument(skip(self))]
    pub fn new_game(
        &self,
        player1_name: &str,
        player2_name: Option<&str>,
        player1_symbol: Option<Symbol>,
    ) -> Result<GameSnapshot, LeagueError> {
        let player1_name = player1_name.trim();
        let player2_name = player2_name.map(str::trim).unwrap_or_default();
        if player1_name.is_empty() {
            return Err(LeagueError::Validation("player1_name is required".to_string()));
        }
        if player2_name.is_empty() {
            return Err(LeagueError::Validation("player2_name is required".to_string()));
        }
        if player1_name == player2_name {
            return Err(LeagueError::Validation(
                "A game needs two different players".to_string(),
            ));
        }

        let player1 = self
            .repository
            .find_user_by_name(player1_name)?
            .ok_or_else(|| LeagueError::NotFound("Player 1 does not exist!".to_string()))?;
        let player2 = self
            .repository
            .find_user_by_name(player2_name)?
            .ok_or_else(|| LeagueError::NotFound("Player 2 does not exist!".to_string()))?;

        let game = self.repository.create_game(
            *player1.id(),
            *player2.id(),
            player1_symbol.unwrap_or(Symbol::X),
        )?;
        self.moves_remaining.invalidate();

        info!(game_id = game.id(), "Game started");
        Ok(GameSnapshot::new(
            &game,
            player1.name().clone(),
            player2.name().clone(),
            "Good luck playing Tic Tac Toe!".to_string(),
        ))
    }

    /// Current state of a game.
    #[instrument(skip(self))]
    pub fn get_game(&self, id: GameId) -> Result<GameSnapshot, LeagueError> {
        let game = self.load_game(id)?;
        let message = game.status_message();
        self.snapshot(&game, message)
    }

    /// Applies a move and, when it ends the game, records the score and
    /// both rankings in the same commit.
    ///
    /// A move on a finished game changes nothing and reports
    /// "Game already over!".
    ///
    /// # Errors
    ///
    /// The move errors in the order [`LeagueError::WrongTurn`],
    /// [`LeagueError::InvalidSquare`], [`LeagueError::SquareOccupied`];
    /// [`LeagueError::Conflict`] if the game kept changing underneath.
    #[instrument(skip(self))]
    pub fn make_move(
        &self,
        id: GameId,
        symbol: Symbol,
        square: i32,
    ) -> Result<GameSnapshot, LeagueError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut game = self.load_game(id)?;
            let expected_moves = game.number_of_moves();

            let outcome = game.apply_move(symbol, square)?;
            if outcome == MoveOutcome::AlreadyOver {
                return self.snapshot(&game, outcome.message());
            }

            let score = outcome
                .finished()
                .map(|finished| NewScore::for_game(&game, finished, today()));
            let commit = MoveCommit {
                game: game.clone(),
                expected_moves,
                score,
            };

            match self.repository.commit_move(commit) {
                Ok(recorded) => {
                    self.moves_remaining.invalidate();
                    if let Some(score) = recorded {
                        info!(score_id = score.id(), "Game scored");
                    }
                    debug!(moves = game.number_of_moves(), "Move committed");
                    return self.snapshot(&game, outcome.message());
                }
                Err(e) if e.is_stale() && attempt < MAX_COMMIT_ATTEMPTS => {
                    warn!(attempt, "Game changed during move, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Cancels an in-progress game. A finished game is left as it is.
    #[instrument(skip(self))]
    pub fn cancel_game(&self, id: GameId) -> Result<MessageView, LeagueError> {
        let mut game = self.load_game(id)?;
        if game.is_over() {
            return Ok(MessageView::new(CancelOutcome::AlreadyEnded.message()));
        }

        let outcome = if self.repository.cancel_game(id)? {
            self.moves_remaining.invalidate();
            game.cancel()
        } else {
            debug!("Game finished before it could be cancelled");
            CancelOutcome::AlreadyEnded
        };
        Ok(MessageView::new(outcome.message()))
    }

    /// In-progress games of a user.
    #[instrument(skip(self))]
    pub fn list_games_for_user(&self, name: &str) -> Result<Vec<GameSnapshot>, LeagueError> {
        let user = self.user_by_name(name)?;
        let games = self.repository.active_games_for_player(*user.id())?;
        let names = self.user_names()?;

        debug!(count = games.len(), "Active games found");
        games
            .iter()
            .map(|game| snapshot_with(&names, game, game.status_message()))
            .collect()
    }

    /// Every recorded score.
    #[instrument(skip(self))]
    pub fn list_scores(&self) -> Result<Vec<ScoreSnapshot>, LeagueError> {
        let scores = self.repository.list_scores()?;
        let names = self.user_names()?;
        scores
            .iter()
            .map(|score| {
                Ok(ScoreSnapshot::new(
                    score,
                    name_of(&names, *score.player1())?,
                    name_of(&names, *score.player2())?,
                ))
            })
            .collect()
    }

    /// Scores of the games a user took part in.
    #[instrument(skip(self))]
    pub fn list_scores_for_user(&self, name: &str) -> Result<Vec<ScoreSnapshot>, LeagueError> {
        let user = self.user_by_name(name)?;
        let scores = self.repository.scores_for_player(*user.id())?;
        let names = self.user_names()?;
        scores
            .iter()
            .map(|score| {
                Ok(ScoreSnapshot::new(
                    score,
                    name_of(&names, *score.player1())?,
                    name_of(&names, *score.player2())?,
                ))
            })
            .collect()
    }

    /// The leaderboard, highest ranking first.
    #[instrument(skip(self))]
    pub fn list_rankings(&self) -> Result<Vec<RankingSnapshot>, LeagueError> {
        let rankings = self.repository.list_rankings()?;
        let names = self.user_names()?;
        rankings
            .iter()
            .map(|ranking| Ok(RankingSnapshot::new(ranking, name_of(&names, *ranking.player())?)))
            .collect()
    }

    /// Moves of a game in play order.
    #[instrument(skip(self))]
    pub fn game_history(&self, id: GameId) -> Result<HistoryView, LeagueError> {
        let game = self.load_game(id)?;
        Ok(HistoryView {
            game_id: game.id(),
            moves: game.history(),
            board: game.board().to_string(),
            message: game.status_message(),
        })
    }

    /// Average moves remaining over in-progress games.
    ///
    /// The message is empty when no game is in progress.
    #[instrument(skip(self))]
    pub fn average_moves_remaining(&self) -> Result<MessageView, LeagueError> {
        let message = self.moves_remaining.get_or_compute(|| {
            let games = self.repository.active_games()?;
            Ok::<_, LeagueError>(format_average(average_moves_remaining(&games)))
        })?;
        Ok(MessageView::new(message))
    }

    /// Reminders for users with an email and at least one game in progress.
    #[instrument(skip(self))]
    pub fn pending_reminders(&self) -> Result<Vec<Reminder>, LeagueError> {
        let users = self.repository.list_users()?;
        let mut reminders = Vec::new();
        for user in users {
            let Some(email) = user.email().clone() else {
                continue;
            };
            let games = self.repository.active_games_for_player(*user.id())?;
            if games.is_empty() {
                continue;
            }
            let game_ids = games.iter().map(Game::id).collect();
            reminders.push(Reminder::new(user.name().clone(), email, game_ids));
        }

        info!(count = reminders.len(), "Reminders composed");
        Ok(reminders)
    }

    fn load_game(&self, id: GameId) -> Result<Game, LeagueError> {
        self.repository
            .get_game(id)?
            .ok_or_else(LeagueError::game_not_found)
    }

    fn user_by_name(&self, name: &str) -> Result<User, LeagueError> {
        self.repository
            .find_user_by_name(name.trim())?
            .ok_or_else(LeagueError::user_not_found)
    }

    fn user_names(&self) -> Result<HashMap<PlayerId, String>, LeagueError> {
        Ok(self
            .repository
            .list_users()?
            .into_iter()
            .map(|user| (*user.id(), user.name().clone()))
            .collect())
    }

    fn snapshot(&self, game: &Game, message: String) -> Result<GameSnapshot, LeagueError> {
        let player1 = self
            .repository
            .get_user(game.player1())?
            .ok_or_else(LeagueError::user_not_found)?;
        let player2 = self
            .repository
            .get_user(game.player2())?
            .ok_or_else(LeagueError::user_not_found)?;
        Ok(GameSnapshot::new(
            game,
            player1.name().clone(),
            player2.name().clone(),
            message,
        ))
    }
}

fn snapshot_with(
    names: &HashMap<PlayerId, String>,
    game: &Game,
    message: String,
) -> Result<GameSnapshot, LeagueError> {
    Ok(GameSnapshot::new(
        game,
        name_of(names, game.player1())?,
        name_of(names, game.player2())?,
        message,
    ))
}

fn name_of(names: &HashMap<PlayerId, String>, player: PlayerId) -> Result<String, LeagueError> {
    names
        .get(&player)
        .cloned()
        .ok_or_else(LeagueError::user_not_found)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
