//! Paddle Room - player tracking service with simulated table-tennis matches
//!
//! This crate provides player storage behind a deadline-aware repository, a
//! match simulation engine built on rendezvous channels, and the REST API,
//! sign-in and metrics around them.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod game;
pub mod metrics;
pub mod player;
pub mod service;
pub mod storage;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{ArenaError, Result};
pub use types::*;

// Re-export key components
pub use game::{MatchEngine, MatchService};
pub use player::PlayerService;
pub use storage::{InMemoryPlayerRepository, PlayerRepository, RequestContext};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
