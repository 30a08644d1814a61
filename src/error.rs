//! Error types for the player tracking service
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the application. Layers add context with `anyhow::Context`; callers
//! that need to branch on the failure kind use `downcast_ref::<ArenaError>()`.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific player and match scenarios
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArenaError {
    /// Rendered verbatim so that the newline-joined validation messages reach callers as-is
    #[error("{message}")]
    Validation { message: String },

    #[error("Player not found: {player_id}")]
    PlayerNotFound { player_id: String },

    #[error("The player with ID: {player_id} already exists")]
    AlreadyExists { player_id: String },

    #[error("Operation {operation} was cancelled")]
    Cancelled { operation: String },

    #[error("Could not finish {operation} operation at time: deadline exceeded")]
    DeadlineExceeded { operation: String },

    #[error("Unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("Invalid token: {reason}")]
    InvalidToken { reason: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal service error: {message}")]
    InternalError { message: String },
}

impl ArenaError {
    /// True for the two errors a fired request context produces
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            ArenaError::Cancelled { .. } | ArenaError::DeadlineExceeded { .. }
        )
    }
}

/// Find the `ArenaError` carried anywhere in an anyhow chain
pub fn arena_error(err: &anyhow::Error) -> Option<&ArenaError> {
    err.chain().find_map(|cause| cause.downcast_ref::<ArenaError>())
}
