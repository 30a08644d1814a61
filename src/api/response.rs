//! JSON responses and error shaping for the HTTP API

use crate::error::{arena_error, ArenaError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

/// Status code for a service error
pub fn status_for(err: &ArenaError) -> StatusCode {
    match err {
        ArenaError::Validation { .. } | ArenaError::InvalidToken { .. } => StatusCode::BAD_REQUEST,
        ArenaError::PlayerNotFound { .. } => StatusCode::NOT_FOUND,
        ArenaError::AlreadyExists { .. } => StatusCode::CONFLICT,
        ArenaError::Cancelled { .. } | ArenaError::DeadlineExceeded { .. } => {
            StatusCode::GATEWAY_TIMEOUT
        }
        ArenaError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
        ArenaError::ConfigurationError { .. } | ArenaError::InternalError { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Error returned by handlers, rendered as `{"error": "..."}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        let status = arena_error(&err)
            .map(status_for)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Validation messages go out exactly as produced
        let message = match err.downcast_ref::<ArenaError>() {
            Some(ArenaError::Validation { message }) => message.clone(),
            _ => format!("{:#}", err),
        };

        if status.is_server_error() {
            error!(status = status.as_u16(), "Request failed: {}", message);
        } else {
            warn!(status = status.as_u16(), "Request rejected: {}", message);
        }
        Self { status, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
