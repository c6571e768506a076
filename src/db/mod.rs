//! Database persistence layer for users, games, scores and rankings.

mod error;
mod memory;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only
mod sqlite;

pub use error::{DbError, DbErrorKind};
pub use memory::MemoryRepository;
pub use models::{NewUser, User};
pub use repository::{GameStore, MoveCommit, RankingStore, Repository, ScoreStore, UserRegistry};
pub use sqlite::{MIGRATIONS, SqliteRepository};
