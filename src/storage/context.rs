//! Request-scoped cancellation and deadlines
//!
//! Every storage operation takes a [`RequestContext`]. The context fires either
//! when its cancellation token is cancelled or when its deadline passes, and
//! the operation that is racing it gives up immediately.

use crate::error::ArenaError;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a context fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    Cancelled,
    DeadlineExceeded,
}

impl ContextError {
    /// Convert into the service error for the named operation
    pub fn into_arena_error(self, operation: &str) -> ArenaError {
        match self {
            ContextError::Cancelled => ArenaError::Cancelled {
                operation: operation.to_string(),
            },
            ContextError::DeadlineExceeded => ArenaError::DeadlineExceeded {
                operation: operation.to_string(),
            },
        }
    }
}

impl std::fmt::Display for ContextError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContextError::Cancelled => write!(f, "context cancelled"),
            ContextError::DeadlineExceeded => write!(f, "context deadline exceeded"),
        }
    }
}

/// Cancellation signal plus optional deadline carried by a caller
#[derive(Debug, Clone)]
pub struct RequestContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A context that never fires unless cancelled explicitly
    pub fn background() -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: None,
        }
    }

    /// A context that fires once `timeout` has elapsed
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    /// Derive a context that is cancelled with this one and keeps its deadline
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Derive a context with a tighter deadline; the earlier of the two wins
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(existing) if existing < candidate => existing,
            _ => candidate,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The reason this context has fired, if it has
    pub fn error(&self) -> Option<ContextError> {
        if self.token.is_cancelled() {
            return Some(ContextError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.error().is_some()
    }

    /// Resolve once the context fires
    pub async fn done(&self) -> ContextError {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.token.cancelled() => ContextError::Cancelled,
                    _ = tokio::time::sleep_until(deadline) => ContextError::DeadlineExceeded,
                }
            }
            None => {
                self.token.cancelled().await;
                ContextError::Cancelled
            }
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::background()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_background_context_is_not_done() {
        let ctx = RequestContext::background();
        assert!(!ctx.is_done());
        assert!(ctx.deadline().is_none());

        let fired = tokio::time::timeout(Duration::from_millis(20), ctx.done()).await;
        assert!(fired.is_err());
    }

    #[tokio::test]
    async fn test_cancel_fires_done() {
        let ctx = RequestContext::background();
        ctx.cancel();
        assert_eq!(ctx.error(), Some(ContextError::Cancelled));
        assert_eq!(ctx.done().await, ContextError::Cancelled);
    }

    #[tokio::test]
    async fn test_deadline_fires_done() {
        let ctx = RequestContext::with_timeout(Duration::from_millis(10));
        assert_eq!(ctx.done().await, ContextError::DeadlineExceeded);
        assert_eq!(ctx.error(), Some(ContextError::DeadlineExceeded));
    }

    #[tokio::test]
    async fn test_child_follows_parent_cancellation() {
        let parent = RequestContext::with_timeout(Duration::from_secs(60));
        let child = parent.child();
        assert_eq!(child.deadline(), parent.deadline());

        parent.cancel();
        assert_eq!(child.error(), Some(ContextError::Cancelled));

        // Cancelling a child leaves the parent alone
        let parent = RequestContext::background();
        let child = parent.child();
        child.cancel();
        assert!(!parent.is_done());
    }

    #[tokio::test]
    async fn test_child_with_timeout_keeps_earlier_deadline() {
        let parent = RequestContext::with_timeout(Duration::from_millis(50));
        let child = parent.child_with_timeout(Duration::from_secs(60));
        assert_eq!(child.deadline(), parent.deadline());

        let tighter = parent.child_with_timeout(Duration::from_millis(1));
        assert!(tighter.deadline().unwrap() < parent.deadline().unwrap());
    }

    #[test]
    fn test_context_error_conversion() {
        let err = ContextError::DeadlineExceeded.into_arena_error("save");
        assert_eq!(
            err,
            ArenaError::DeadlineExceeded {
                operation: "save".to_string()
            }
        );
        assert!(err.is_cancellation());
    }
}
