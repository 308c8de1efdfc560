use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use taskboard_core::core_board::{BoardError, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing or empty x-user-id header")]
    MissingCaller,

    /// The handler did not answer within `server.request_timeout`.
    ///
    /// The board operation runs on the blocking pool and is not cancelled,
    /// so a mutation may still commit after this is returned. Clients must
    /// re-fetch the board before retrying.
    #[error("Request timed out; the change may still have been applied, re-fetch before retrying")]
    Timeout,

    #[error(transparent)]
    Board(#[from] BoardError),
}

/// JSON error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingCaller => StatusCode::UNAUTHORIZED,
            ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Board(e) => match e.kind() {
                ErrorKind::Forbidden => StatusCode::FORBIDDEN,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::MissingCaller => "unauthenticated",
            ApiError::Timeout => "timeout",
            ApiError::Board(e) => match e.kind() {
                ErrorKind::Forbidden => "forbidden",
                ErrorKind::NotFound => "not_found",
                ErrorKind::Validation => "validation",
                ErrorKind::Conflict => "conflict",
                ErrorKind::Internal => "internal",
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = ErrorResponse {
            error: self.to_string(),
            kind: self.kind().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
