//! In-memory repository for tests and throwaway runs.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use crate::db::{
    DbError, DbErrorKind, GameStore, MoveCommit, RankingStore, Repository, ScoreStore, User,
    UserRegistry,
};
use crate::games::tictactoe::{Game, GameId, PlayerId, Symbol};
use crate::ranking::{PlayerRanking, Score};

#[derive(Debug, Default)]
struct MemoryState {
    users: BTreeMap<PlayerId, User>,
    games: BTreeMap<GameId, Game>,
    scores: Vec<Score>,
    rankings: BTreeMap<PlayerId, PlayerRanking>,
    last_user_id: i32,
    last_game_id: i32,
    last_score_id: i32,
}

/// Repository holding every record behind a single mutex.
///
/// Each operation holds the lock for its whole duration, which gives
/// [`Repository::commit_move`] the same all-or-nothing behaviour as the
/// SQLite transaction.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    state: Mutex<MemoryState>,
}

impl MemoryRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>, DbError> {
        self.state
            .lock()
            .map_err(|_| DbError::new("Repository lock poisoned"))
    }
}

impl UserRegistry for MemoryRepository {
    #[instrument(skip(self, email))]
    fn create_user(&self, name: &str, email: Option<&str>) -> Result<User, DbError> {
        let mut state = self.state()?;
        if state.users.values().any(|u| u.name() == name) {
            debug!("Name already registered");
            return Err(DbError::with_kind(
                DbErrorKind::Conflict,
                format!("User '{}' already exists", name),
            ));
        }

        state.last_user_id += 1;
        let id = state.last_user_id;
        let user = User::new(
            id,
            name.to_string(),
            email.map(str::to_string),
            Utc::now().naive_utc(),
        );
        state.users.insert(id, user.clone());
        state.rankings.insert(id, PlayerRanking::new(id));

        info!(user_id = id, "User created");
        Ok(user)
    }

    fn find_user_by_name(&self, name: &str) -> Result<Option<User>, DbError> {
        let state = self.state()?;
        Ok(state.users.values().find(|u| u.name() == name).cloned())
    }

    fn get_user(&self, id: PlayerId) -> Result<Option<User>, DbError> {
        Ok(self.state()?.users.get(&id).cloned())
    }

    fn list_users(&self) -> Result<Vec<User>, DbError> {
        Ok(self.state()?.users.values().cloned().collect())
    }
}

impl GameStore for MemoryRepository {
    #[instrument(skip(self))]
    fn create_game(
        &self,
        player1: PlayerId,
        player2: PlayerId,
        player1_symbol: Symbol,
    ) -> Result<Game, DbError> {
        let mut state = self.state()?;
        for player in [player1, player2] {
            if !state.users.contains_key(&player) {
                return Err(DbError::with_kind(
                    DbErrorKind::NotFound,
                    format!("User {} not found", player),
                ));
            }
        }

        state.last_game_id += 1;
        let game = Game::new(state.last_game_id, player1, player2, player1_symbol);
        state.games.insert(game.id(), game.clone());

        info!(game_id = game.id(), "Game created");
        Ok(game)
    }

    fn get_game(&self, id: GameId) -> Result<Option<Game>, DbError> {
        Ok(self.state()?.games.get(&id).cloned())
    }

    #[instrument(skip(self))]
    fn cancel_game(&self, id: GameId) -> Result<bool, DbError> {
        let mut state = self.state()?;
        let cancelled = match state.games.get_mut(&id) {
            Some(game) if !game.is_over() => {
                game.cancel();
                true
            }
            _ => false,
        };
        info!(cancelled, "Cancel applied");
        Ok(cancelled)
    }

    #[instrument(skip(self))]
    fn delete_game(&self, id: GameId) -> Result<(), DbError> {
        let mut state = self.state()?;
        if state.scores.iter().any(|s| *s.game_id() == id) {
            return Err(DbError::new(format!("Game {} has a recorded score", id)));
        }
        state.games.remove(&id).map(|_| ()).ok_or_else(|| {
            DbError::with_kind(DbErrorKind::NotFound, format!("Game {} not found", id))
        })
    }

    fn active_games_for_player(&self, player: PlayerId) -> Result<Vec<Game>, DbError> {
        let state = self.state()?;
        Ok(state
            .games
            .values()
            .filter(|g| !g.is_over() && g.involves(player))
            .cloned()
            .collect())
    }

    fn active_games(&self) -> Result<Vec<Game>, DbError> {
        let state = self.state()?;
        Ok(state
            .games
            .values()
            .filter(|g| !g.is_over())
            .cloned()
            .collect())
    }
}

impl ScoreStore for MemoryRepository {
    fn list_scores(&self) -> Result<Vec<Score>, DbError> {
        Ok(self.state()?.scores.clone())
    }

    fn scores_for_player(&self, player: PlayerId) -> Result<Vec<Score>, DbError> {
        let state = self.state()?;
        Ok(state
            .scores
            .iter()
            .filter(|s| s.involves(player))
            .cloned()
            .collect())
    }
}

impl RankingStore for MemoryRepository {
    fn get_ranking(&self, player: PlayerId) -> Result<Option<PlayerRanking>, DbError> {
        Ok(self.state()?.rankings.get(&player).cloned())
    }

    fn list_rankings(&self) -> Result<Vec<PlayerRanking>, DbError> {
        let mut rankings: Vec<_> = self.state()?.rankings.values().cloned().collect();
        rankings.sort_by(|a, b| {
            b.ranking()
                .total_cmp(a.ranking())
                .then_with(|| a.player().cmp(b.player()))
        });
        Ok(rankings)
    }
}

impl Repository for MemoryRepository {
    #[instrument(
        skip(self, commit),
        fields(game_id = commit.game.id(), expected_moves = commit.expected_moves)
    )]
    fn commit_move(&self, commit: MoveCommit) -> Result<Option<Score>, DbError> {
        let mut state = self.state()?;
        let id = commit.game.id();

        let current = state.games.get(&id).ok_or_else(|| {
            DbError::with_kind(DbErrorKind::NotFound, format!("Game {} not found", id))
        })?;
        if current.is_over() || current.number_of_moves() != commit.expected_moves {
            warn!("Game changed since it was read");
            return Err(DbError::stale(format!(
                "Game {} is no longer at move {}",
                id, commit.expected_moves
            )));
        }

        // Every check runs before the first write.
        if let Some(ref score) = commit.score {
            if state.scores.iter().any(|s| s.game_id() == score.game_id()) {
                return Err(DbError::with_kind(
                    DbErrorKind::Conflict,
                    format!("Game {} already has a score", id),
                ));
            }
            for (player, _) in score.results() {
                if !state.rankings.contains_key(&player) {
                    return Err(DbError::with_kind(
                        DbErrorKind::NotFound,
                        format!("No ranking for player {}", player),
                    ));
                }
            }
        }

        state.games.insert(id, commit.game);

        let Some(new_score) = commit.score else {
            return Ok(None);
        };
        for (player, result) in new_score.results() {
            if let Some(ranking) = state.rankings.get_mut(&player) {
                ranking.record(result);
            }
        }
        state.last_score_id += 1;
        let score = new_score.into_score(state.last_score_id);
        state.scores.push(score.clone());

        info!(score_id = score.id(), winner = %score.winner(), "Score recorded");
        Ok(Some(score))
    }
}
