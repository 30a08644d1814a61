//! Service layer for the paddle-room service
//!
//! The application state shared by the HTTP API and the health checks run
//! against it.

pub mod app;
pub mod health;

pub use app::{AppState, ServiceError};
pub use health::{ComponentCheck, HealthCheck, HealthStatus};
