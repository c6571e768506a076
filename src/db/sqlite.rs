//! SQLite-backed repository.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument, warn};

use crate::db::models::{
    GameRow, NewGameRow, NewScoreRow, RankingRow, ScoreRow, encode_moves, encode_status,
};
use crate::db::schema::{games, rankings, scores, users};
use crate::db::{
    DbError, DbErrorKind, GameStore, MoveCommit, NewUser, RankingStore, Repository, ScoreStore,
    User, UserRegistry,
};
use crate::games::tictactoe::{Game, GameId, GameStatus, PlayerId, Symbol};
use crate::ranking::{PlayerRanking, Score};

/// Schema migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

const IN_PROGRESS: &str = "in_progress";

/// Repository over a SQLite database file.
///
/// Every call opens its own connection; writers serialize on SQLite's
/// database lock.
#[derive(Debug, Clone)]
pub struct SqliteRepository {
    db_path: String,
}

impl SqliteRepository {
    /// Opens the database at `db_path`, creating it and applying pending
    /// migrations as needed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        info!(path = %db_path, "Opening SqliteRepository");
        let repository = Self { db_path };
        let mut conn = repository.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(format!("Migrations failed: {}", e)))?;
        info!(applied = applied.len(), "Migrations up to date");
        Ok(repository)
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_path).map_err(|e| {
            DbError::new(format!("Failed to connect to '{}': {}", self.db_path, e))
        })?;
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")?;
        Ok(conn)
    }

    fn load_games(rows: Vec<GameRow>) -> Result<Vec<Game>, DbError> {
        rows.into_iter().map(GameRow::into_game).collect()
    }

    fn load_scores(rows: Vec<ScoreRow>) -> Result<Vec<Score>, DbError> {
        rows.into_iter().map(ScoreRow::into_score).collect()
    }
}

impl UserRegistry for SqliteRepository {
    #[instrument(skip(self, email))]
    fn create_user(&self, name: &str, email: Option<&str>) -> Result<User, DbError> {
        debug!(name = %name, "Creating user");
        let mut conn = self.connection()?;

        let new_user = NewUser::new(name.to_string(), email.map(str::to_string));
        let user = conn.immediate_transaction(|conn| {
            let user = diesel::insert_into(users::table)
                .values(&new_user)
                .returning(User::as_returning())
                .get_result(conn)?;
            diesel::insert_into(rankings::table)
                .values(&RankingRow::from(&PlayerRanking::new(*user.id())))
                .execute(conn)?;
            Ok::<_, DbError>(user)
        })?;

        info!(user_id = user.id(), name = %user.name(), "User created");
        Ok(user)
    }

    #[instrument(skip(self))]
    fn find_user_by_name(&self, name: &str) -> Result<Option<User>, DbError> {
        debug!(name = %name, "Looking up user by name");
        let mut conn = self.connection()?;

        let user = users::table
            .filter(users::name.eq(name))
            .select(User::as_select())
            .first(&mut conn)
            .optional()?;

        if let Some(ref u) = user {
            debug!(user_id = u.id(), "User found");
        } else {
            debug!("User not found");
        }
        Ok(user)
    }

    #[instrument(skip(self))]
    fn get_user(&self, id: PlayerId) -> Result<Option<User>, DbError> {
        let mut conn = self.connection()?;
        let user = users::table
            .find(id)
            .select(User::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(user)
    }

    #[instrument(skip(self))]
    fn list_users(&self) -> Result<Vec<User>, DbError> {
        debug!("Listing all users");
        let mut conn = self.connection()?;

        let users = users::table
            .order((users::created_at.asc(), users::id.asc()))
            .select(User::as_select())
            .load(&mut conn)?;

        info!(count = users.len(), "Users loaded");
        Ok(users)
    }
}

impl GameStore for SqliteRepository {
    #[instrument(skip(self))]
    fn create_game(
        &self,
        player1: PlayerId,
        player2: PlayerId,
        player1_symbol: Symbol,
    ) -> Result<Game, DbError> {
        let mut conn = self.connection()?;
        let row = NewGameRow {
            player1_id: player1,
            player2_id: player2,
            player1_symbol: player1_symbol.to_string(),
            player2_symbol: player1_symbol.opponent().to_string(),
        };

        let game = conn.immediate_transaction(|conn| {
            for player in [player1, player2] {
                let exists = diesel::select(diesel::dsl::exists(users::table.find(player)))
                    .get_result::<bool>(conn)?;
                if !exists {
                    return Err(DbError::with_kind(
                        DbErrorKind::NotFound,
                        format!("User {} not found", player),
                    ));
                }
            }

            diesel::insert_into(games::table)
                .values(&row)
                .returning(GameRow::as_returning())
                .get_result(conn)?
                .into_game()
        })?;

        info!(game_id = game.id(), "Game created");
        Ok(game)
    }

    #[instrument(skip(self))]
    fn get_game(&self, id: GameId) -> Result<Option<Game>, DbError> {
        let mut conn = self.connection()?;
        games::table
            .find(id)
            .select(GameRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(GameRow::into_game)
            .transpose()
    }

    #[instrument(skip(self))]
    fn cancel_game(&self, id: GameId) -> Result<bool, DbError> {
        let mut conn = self.connection()?;
        let updated = diesel::update(
            games::table
                .filter(games::id.eq(id))
                .filter(games::status.eq(IN_PROGRESS)),
        )
        .set((
            games::status.eq(encode_status(GameStatus::Cancelled)),
            games::updated_at.eq(diesel::dsl::now),
        ))
        .execute(&mut conn)?;

        info!(cancelled = updated == 1, "Cancel applied");
        Ok(updated == 1)
    }

    #[instrument(skip(self))]
    fn delete_game(&self, id: GameId) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let deleted = diesel::delete(games::table.find(id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(DbError::with_kind(
                DbErrorKind::NotFound,
                format!("Game {} not found", id),
            ));
        }
        info!("Game deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    fn active_games_for_player(&self, player: PlayerId) -> Result<Vec<Game>, DbError> {
        let mut conn = self.connection()?;
        let rows = games::table
            .filter(games::status.eq(IN_PROGRESS))
            .filter(games::player1_id.eq(player).or(games::player2_id.eq(player)))
            .order(games::id.asc())
            .select(GameRow::as_select())
            .load(&mut conn)?;

        debug!(count = rows.len(), "Active games loaded");
        Self::load_games(rows)
    }

    #[instrument(skip(self))]
    fn active_games(&self) -> Result<Vec<Game>, DbError> {
        let mut conn = self.connection()?;
        let rows = games::table
            .filter(games::status.eq(IN_PROGRESS))
            .order(games::id.asc())
            .select(GameRow::as_select())
            .load(&mut conn)?;
        Self::load_games(rows)
    }
}

impl ScoreStore for SqliteRepository {
    #[instrument(skip(self))]
    fn list_scores(&self) -> Result<Vec<Score>, DbError> {
        let mut conn = self.connection()?;
        let rows = scores::table
            .order(scores::id.asc())
            .select(ScoreRow::as_select())
            .load(&mut conn)?;
        Self::load_scores(rows)
    }

    #[instrument(skip(self))]
    fn scores_for_player(&self, player: PlayerId) -> Result<Vec<Score>, DbError> {
        let mut conn = self.connection()?;
        let rows = scores::table
            .filter(scores::player1_id.eq(player).or(scores::player2_id.eq(player)))
            .order(scores::id.asc())
            .select(ScoreRow::as_select())
            .load(&mut conn)?;
        Self::load_scores(rows)
    }
}

impl RankingStore for SqliteRepository {
    #[instrument(skip(self))]
    fn get_ranking(&self, player: PlayerId) -> Result<Option<PlayerRanking>, DbError> {
        let mut conn = self.connection()?;
        let row = rankings::table
            .find(player)
            .select(RankingRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(PlayerRanking::from))
    }

    #[instrument(skip(self))]
    fn list_rankings(&self) -> Result<Vec<PlayerRanking>, DbError> {
        let mut conn = self.connection()?;
        let rows = rankings::table
            .order((rankings::ranking.desc(), rankings::user_id.asc()))
            .select(RankingRow::as_select())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(PlayerRanking::from).collect())
    }
}

impl Repository for SqliteRepository {
    #[instrument(
        skip(self, commit),
        fields(game_id = commit.game.id(), expected_moves = commit.expected_moves)
    )]
    fn commit_move(&self, commit: MoveCommit) -> Result<Option<Score>, DbError> {
        let MoveCommit {
            game,
            expected_moves,
            score,
        } = commit;
        let moves = encode_moves(game.moves())?;
        let mut conn = self.connection()?;

        conn.immediate_transaction(|conn| {
            let updated = diesel::update(
                games::table
                    .filter(games::id.eq(game.id()))
                    .filter(games::status.eq(IN_PROGRESS))
                    .filter(games::number_of_moves.eq(expected_moves as i32)),
            )
            .set((
                games::board.eq(game.board().to_compact()),
                games::moves.eq(&moves),
                games::number_of_moves.eq(game.number_of_moves() as i32),
                games::status.eq(encode_status(game.status())),
                games::updated_at.eq(diesel::dsl::now),
            ))
            .execute(conn)?;

            if updated != 1 {
                warn!("Game changed since it was read");
                return Err(DbError::stale(format!(
                    "Game {} is no longer at move {}",
                    game.id(),
                    expected_moves
                )));
            }

            let Some(new_score) = score else {
                return Ok(None);
            };

            let stored = diesel::insert_into(scores::table)
                .values(&NewScoreRow::from(&new_score))
                .returning(ScoreRow::as_returning())
                .get_result(conn)?;

            for (player, result) in new_score.results() {
                let row = rankings::table
                    .find(player)
                    .select(RankingRow::as_select())
                    .first(conn)
                    .optional()?
                    .ok_or_else(|| {
                        DbError::with_kind(
                            DbErrorKind::NotFound,
                            format!("No ranking for player {}", player),
                        )
                    })?;

                let mut ranking = PlayerRanking::from(row);
                ranking.record(result);
                let row = RankingRow::from(&ranking);

                diesel::update(rankings::table.find(player))
                    .set((
                        rankings::total_games.eq(row.total_games),
                        rankings::wins.eq(row.wins),
                        rankings::draws.eq(row.draws),
                        rankings::ranking.eq(row.ranking),
                    ))
                    .execute(conn)?;
            }

            info!(score_id = stored.id, winner = %stored.winner, "Score recorded");
            stored.into_score().map(Some)
        })
    }
}
