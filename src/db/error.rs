//! Database error types.

use derive_more::{Display, Error};
use tracing::instrument;

/// Category of a storage failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum DbErrorKind {
    /// A unique constraint rejected the write.
    #[display("conflict")]
    Conflict,
    /// The referenced record does not exist.
    #[display("not found")]
    NotFound,
    /// The record changed since it was read.
    #[display("stale")]
    Stale,
    /// A stored value could not be decoded.
    #[display("corrupt")]
    Corrupt,
    /// Any other backend failure.
    #[display("backend")]
    Backend,
}

/// Database error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Database error ({}): {} at {}:{}", kind, message, file, line)]
pub struct DbError {
    /// Failure category.
    pub kind: DbErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DbError {
    /// Creates a backend error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_kind(DbErrorKind::Backend, message)
    }

    /// Creates an error of the given kind with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn with_kind(kind: DbErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// The record changed between read and write.
    #[track_caller]
    pub fn stale(message: impl Into<String>) -> Self {
        Self::with_kind(DbErrorKind::Stale, message)
    }

    /// A stored value could not be decoded.
    #[track_caller]
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::with_kind(DbErrorKind::Corrupt, message)
    }

    /// True if a compare-and-set write lost a race.
    pub fn is_stale(&self) -> bool {
        self.kind == DbErrorKind::Stale
    }
}

impl From<diesel::result::Error> for DbError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};
        let kind = match &err {
            Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => DbErrorKind::Conflict,
            Error::NotFound => DbErrorKind::NotFound,
            _ => DbErrorKind::Backend,
        };
        Self::with_kind(kind, format!("Diesel error: {}", err))
    }
}

impl From<diesel::ConnectionError> for DbError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        Self::new(format!("Connection error: {}", err))
    }
}
