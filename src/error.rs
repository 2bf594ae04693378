use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use crate::models::StrategyId;

/// Errors surfaced to the presentation layer by the HTTP API
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Strategy {0} is not active")]
    InactiveStrategy(StrategyId),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::InactiveStrategy(_) => (StatusCode::CONFLICT, self.to_string()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Failure of a single call to the remote recommendation service
///
/// Every variant carries a human-readable message. These never leave the
/// lifecycle controller: they are recorded as a strategy's `Failed` state.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RecommendationError {
    #[error("Recommendation service unreachable: {0}")]
    Transport(String),

    #[error("Recommendation service returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed recommendation response: {0}")]
    MalformedResponse(String),

    /// The request task ended without producing an outcome
    #[error("Recommendation request interrupted: {0}")]
    Interrupted(String),
}

impl RecommendationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RecommendationError::Transport(_) => ErrorKind::Transport,
            RecommendationError::Status { .. } => ErrorKind::Status,
            RecommendationError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            RecommendationError::Interrupted(_) => ErrorKind::Interrupted,
        }
    }
}

impl From<reqwest::Error> for RecommendationError {
    fn from(err: reqwest::Error) -> Self {
        RecommendationError::Transport(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Transport,
    Status,
    MalformedResponse,
    Interrupted,
}
