//! Database models and their conversion to domain types.

use chrono::{NaiveDate, NaiveDateTime};
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use tracing::{instrument, warn};

use crate::db::{DbError, schema};
use crate::games::tictactoe::{CancelOutcome, Game, GameStatus, Outcome, Symbol};
use crate::ranking::{NewScore, PlayerRanking, Score};

/// Registered player.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Selectable, Getters, new)]
#[diesel(table_name = schema::users)]
pub struct User {
    id: i32,
    name: String,
    email: Option<String>,
    created_at: NaiveDateTime,
}

/// Insertable user model for creating new users.
#[derive(Debug, Clone, Insertable, Getters, new)]
#[diesel(table_name = schema::users)]
pub struct NewUser {
    name: String,
    email: Option<String>,
}

/// Stored game row (timestamps are not selected).
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = schema::games)]
pub(crate) struct GameRow {
    pub id: i32,
    pub player1_id: i32,
    pub player2_id: i32,
    pub player1_symbol: String,
    pub player2_symbol: String,
    pub board: String,
    pub moves: String,
    pub number_of_moves: i32,
    pub status: String,
}

impl GameRow {
    /// Restores the domain game by replaying the stored moves.
    ///
    /// # Errors
    ///
    /// Returns a corrupt [`DbError`] if any stored column disagrees with the
    /// replayed game.
    #[instrument(skip(self), fields(game_id = self.id))]
    pub fn into_game(self) -> Result<Game, DbError> {
        let player1_symbol = decode_symbol(&self.player1_symbol)?;
        if decode_symbol(&self.player2_symbol)? != player1_symbol.opponent() {
            return Err(DbError::corrupt(format!("Game {} has matching symbols", self.id)));
        }

        let moves: Vec<usize> = serde_json::from_str(&self.moves)
            .map_err(|e| DbError::corrupt(format!("Game {} moves unreadable: {}", self.id, e)))?;
        let mut game = Game::replay(
            self.id,
            self.player1_id,
            self.player2_id,
            player1_symbol,
            &moves,
        )
        .map_err(|e| DbError::corrupt(format!("Game {}: {}", self.id, e)))?;

        let stored = decode_status(&self.status)?;
        let consistent = if stored == GameStatus::Cancelled {
            game.cancel() == CancelOutcome::Cancelled
        } else {
            stored == game.status()
        };
        let counted = usize::try_from(self.number_of_moves).ok() == Some(game.number_of_moves());

        if !consistent || !counted || self.board != game.board().to_compact() {
            warn!(
                stored_status = %self.status,
                replayed = ?game.status(),
                "Stored game disagrees with replay"
            );
            return Err(DbError::corrupt(format!(
                "Game {} columns disagree with its move list",
                self.id
            )));
        }
        Ok(game)
    }
}

/// Insertable game row; everything else takes the column default.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::games)]
pub(crate) struct NewGameRow {
    pub player1_id: i32,
    pub player2_id: i32,
    pub player1_symbol: String,
    pub player2_symbol: String,
}

/// Stored score row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = schema::scores)]
pub(crate) struct ScoreRow {
    pub id: i32,
    pub game_id: i32,
    pub player1_id: i32,
    pub player2_id: i32,
    pub player1_symbol: String,
    pub player2_symbol: String,
    pub winner: String,
    pub player1_points: i32,
    pub player2_points: i32,
    pub number_of_moves: i32,
    pub completed_on: NaiveDate,
}

impl ScoreRow {
    /// Converts to the domain score.
    pub fn into_score(self) -> Result<Score, DbError> {
        let winner = self
            .winner
            .parse::<Outcome>()
            .map_err(|_| DbError::corrupt(format!("Invalid winner: '{}'", self.winner)))?;
        Ok(Score::new(
            self.id,
            self.game_id,
            self.player1_id,
            self.player2_id,
            decode_symbol(&self.player1_symbol)?,
            decode_symbol(&self.player2_symbol)?,
            winner,
            self.player1_points,
            self.player2_points,
            self.number_of_moves,
            self.completed_on,
        ))
    }
}

/// Insertable score row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::scores)]
pub(crate) struct NewScoreRow {
    pub game_id: i32,
    pub player1_id: i32,
    pub player2_id: i32,
    pub player1_symbol: String,
    pub player2_symbol: String,
    pub winner: String,
    pub player1_points: i32,
    pub player2_points: i32,
    pub number_of_moves: i32,
    pub completed_on: NaiveDate,
}

impl From<&NewScore> for NewScoreRow {
    fn from(score: &NewScore) -> Self {
        Self {
            game_id: *score.game_id(),
            player1_id: *score.player1(),
            player2_id: *score.player2(),
            player1_symbol: score.player1_symbol().to_string(),
            player2_symbol: score.player2_symbol().to_string(),
            winner: score.winner().to_string(),
            player1_points: *score.player1_points(),
            player2_points: *score.player2_points(),
            number_of_moves: *score.number_of_moves(),
            completed_on: *score.completed_on(),
        }
    }
}

/// Stored ranking row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = schema::rankings)]
pub(crate) struct RankingRow {
    pub user_id: i32,
    pub total_games: i32,
    pub wins: i32,
    pub draws: i32,
    pub ranking: f64,
}

impl From<RankingRow> for PlayerRanking {
    fn from(row: RankingRow) -> Self {
        PlayerRanking::from_counts(row.user_id, row.total_games, row.wins, row.draws)
    }
}

impl From<&PlayerRanking> for RankingRow {
    fn from(ranking: &PlayerRanking) -> Self {
        Self {
            user_id: *ranking.player(),
            total_games: *ranking.total_games(),
            wins: *ranking.wins(),
            draws: *ranking.draws(),
            ranking: *ranking.ranking(),
        }
    }
}

/// Converts a status to the string stored in the database.
pub(crate) fn encode_status(status: GameStatus) -> &'static str {
    match status {
        GameStatus::InProgress => "in_progress",
        GameStatus::Won(Symbol::X) => "won_x",
        GameStatus::Won(Symbol::O) => "won_o",
        GameStatus::Draw => "draw",
        GameStatus::Cancelled => "cancelled",
    }
}

/// Parses a status from the string stored in the database.
pub(crate) fn decode_status(s: &str) -> Result<GameStatus, DbError> {
    match s {
        "in_progress" => Ok(GameStatus::InProgress),
        "won_x" => Ok(GameStatus::Won(Symbol::X)),
        "won_o" => Ok(GameStatus::Won(Symbol::O)),
        "draw" => Ok(GameStatus::Draw),
        "cancelled" => Ok(GameStatus::Cancelled),
        _ => Err(DbError::corrupt(format!("Invalid status: '{}'", s))),
    }
}

fn decode_symbol(s: &str) -> Result<Symbol, DbError> {
    s.parse::<Symbol>()
        .map_err(|_| DbError::corrupt(format!("Invalid symbol: '{}'", s)))
}

/// Serializes a move list for the `moves` column.
pub(crate) fn encode_moves(moves: &[usize]) -> Result<String, DbError> {
    serde_json::to_string(moves).map_err(|e| DbError::new(format!("Failed to encode moves: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_for(game: &Game, status: &str) -> GameRow {
        GameRow {
            id: game.id(),
            player1_id: game.player1(),
            player2_id: game.player2(),
            player1_symbol: game.player1_symbol().to_string(),
            player2_symbol: game.player2_symbol().to_string(),
            board: game.board().to_compact(),
            moves: encode_moves(game.moves()).unwrap(),
            number_of_moves: game.number_of_moves() as i32,
            status: status.to_string(),
        }
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            GameStatus::InProgress,
            GameStatus::Won(Symbol::X),
            GameStatus::Won(Symbol::O),
            GameStatus::Draw,
            GameStatus::Cancelled,
        ] {
            assert_eq!(decode_status(encode_status(status)).unwrap(), status);
        }
        assert!(decode_status("paused").is_err());
    }

    #[test]
    fn test_row_restores_game() {
        let game = Game::replay(3, 1, 2, Symbol::X, &[0, 3, 1, 4, 2]).unwrap();
        let restored = row_for(&game, "won_x").into_game().unwrap();
        assert_eq!(restored, game);
    }

    #[test]
    fn test_row_restores_cancelled_game() {
        let game = Game::replay(3, 1, 2, Symbol::X, &[4]).unwrap();
        let restored = row_for(&game, "cancelled").into_game().unwrap();
        assert_eq!(restored.status(), GameStatus::Cancelled);
        assert_eq!(restored.moves(), &[4]);
    }

    #[test]
    fn test_row_with_wrong_status_is_corrupt() {
        let game = Game::replay(3, 1, 2, Symbol::X, &[0, 3, 1, 4, 2]).unwrap();
        let err = row_for(&game, "in_progress").into_game().unwrap_err();
        assert_eq!(err.kind, crate::db::DbErrorKind::Corrupt);

        let err = row_for(&game, "cancelled").into_game().unwrap_err();
        assert_eq!(err.kind, crate::db::DbErrorKind::Corrupt);
    }

    #[test]
    fn test_row_with_wrong_board_is_corrupt() {
        let game = Game::replay(3, 1, 2, Symbol::X, &[4]).unwrap();
        let mut row = row_for(&game, "in_progress");
        row.board = "X        ".to_string();
        assert!(row.into_game().is_err());
    }
}
