//! HTTP error responses.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use derive_more::Display;
use serde_json::json;
use tracing::{error, warn};

use crate::league::LeagueError;

/// Error returned by a route handler, rendered as `{"error": "..."}`.
#[derive(Debug, Clone, Display)]
#[display("{status}: {message}")]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// An error with an explicit status.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// The request could not be served for reasons outside the league.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<LeagueError> for ApiError {
    fn from(err: LeagueError) -> Self {
        let status = match &err {
            LeagueError::NotFound(_) => StatusCode::NOT_FOUND,
            LeagueError::Conflict(_) => StatusCode::CONFLICT,
            LeagueError::InvalidSquare(_)
            | LeagueError::SquareOccupied { .. }
            | LeagueError::WrongTurn(_)
            | LeagueError::Validation(_) => StatusCode::BAD_REQUEST,
            LeagueError::Storage(db) => {
                // Storage details stay in the log.
                error!(error = %db, "Storage failure");
                return Self::internal("Internal storage error");
            }
        };
        Self::new(status, err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, message = %self.message, "Request failed");
        } else {
            warn!(status = %self.status, message = %self.message, "Request rejected");
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
