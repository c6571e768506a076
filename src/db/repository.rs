//! Storage boundary consumed by the league service.
//!
//! Each trait covers one record kind; [`Repository`] combines them and adds
//! [`Repository::commit_move`], the single atomic write behind every move.

use crate::db::{DbError, User};
use crate::games::tictactoe::{Game, GameId, PlayerId, Symbol};
use crate::ranking::{NewScore, PlayerRanking, Score};

/// Registered players.
pub trait UserRegistry {
    /// Creates a user and its zeroed ranking.
    ///
    /// # Errors
    ///
    /// Returns a conflict [`DbError`] if the name is taken.
    fn create_user(&self, name: &str, email: Option<&str>) -> Result<User, DbError>;

    /// Looks a user up by name.
    fn find_user_by_name(&self, name: &str) -> Result<Option<User>, DbError>;

    /// Looks a user up by id.
    fn get_user(&self, id: PlayerId) -> Result<Option<User>, DbError>;

    /// All users, oldest first.
    fn list_users(&self) -> Result<Vec<User>, DbError>;
}

/// Game records.
pub trait GameStore {
    /// Stores a new, empty game and returns it with its id.
    fn create_game(
        &self,
        player1: PlayerId,
        player2: PlayerId,
        player1_symbol: Symbol,
    ) -> Result<Game, DbError>;

    /// Fetches a game.
    fn get_game(&self, id: GameId) -> Result<Option<Game>, DbError>;

    /// Moves an in-progress game to `Cancelled`.
    ///
    /// Returns `false` if the game was no longer in progress.
    fn cancel_game(&self, id: GameId) -> Result<bool, DbError>;

    /// Removes a game record.
    fn delete_game(&self, id: GameId) -> Result<(), DbError>;

    /// In-progress games in which `player` takes part.
    fn active_games_for_player(&self, player: PlayerId) -> Result<Vec<Game>, DbError>;

    /// All in-progress games.
    fn active_games(&self) -> Result<Vec<Game>, DbError>;
}

/// Historical scores.
pub trait ScoreStore {
    /// All scores, oldest first.
    fn list_scores(&self) -> Result<Vec<Score>, DbError>;

    /// Scores of games in which `player` took part, oldest first.
    fn scores_for_player(&self, player: PlayerId) -> Result<Vec<Score>, DbError>;
}

/// Per-player rankings.
pub trait RankingStore {
    /// Fetches a player's ranking.
    fn get_ranking(&self, player: PlayerId) -> Result<Option<PlayerRanking>, DbError>;

    /// All rankings, highest ranking first.
    fn list_rankings(&self) -> Result<Vec<PlayerRanking>, DbError>;
}

/// Everything written when a move is accepted.
#[derive(Debug, Clone)]
pub struct MoveCommit {
    /// The game after the move.
    pub game: Game,
    /// Move count the game had when it was read.
    pub expected_moves: usize,
    /// Score to record, when the move ended the game.
    pub score: Option<NewScore>,
}

/// Complete storage backend.
///
/// There is no standalone game update, score insert or ranking update.
/// Those three writes only happen together through
/// [`commit_move`](Repository::commit_move), so a finished game never
/// exists without its score and ranking changes.
pub trait Repository: UserRegistry + GameStore + ScoreStore + RankingStore + Send + Sync {
    /// Persists an accepted move as one atomic unit.
    ///
    /// The game is written only if the stored copy is still in progress with
    /// `expected_moves` moves. When a score is present it is inserted and
    /// both players' rankings are updated from their stored values in the
    /// same unit.
    ///
    /// # Errors
    ///
    /// Returns a stale [`DbError`] if the stored game changed since it was
    /// read; nothing is written in that case.
    fn commit_move(&self, commit: MoveCommit) -> Result<Option<Score>, DbError>;
}
