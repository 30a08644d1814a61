//! Metrics and monitoring for the paddle-room service
//!
//! Prometheus metrics are collected here and served by the HTTP API on
//! `/metrics`.

pub mod collector;

pub use collector::{GameMetrics, HttpMetrics, MetricsCollector, StorageMetrics};
