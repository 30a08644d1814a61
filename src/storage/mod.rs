//! Player storage gateway
//!
//! The repository trait, the request context every operation is bounded by,
//! and the in-memory implementation used by the service.

pub mod context;
pub mod memory;
pub mod repository;

pub use context::{ContextError, RequestContext};
pub use memory::InMemoryPlayerRepository;
pub use repository::PlayerRepository;

#[cfg(test)]
pub use repository::MockPlayerRepository;
