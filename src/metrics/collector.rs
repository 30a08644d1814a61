//! Metrics collection using Prometheus
//!
//! This module provides metrics collection for the paddle-room service:
//! player and match counters, storage operation outcomes and HTTP traffic.

use anyhow::Result;
use prometheus::{
    Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
};
use std::sync::Arc;
use std::time::Duration;

/// Main metrics collector for the service
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Player and match metrics
    game_metrics: GameMetrics,

    /// Storage gateway metrics
    storage_metrics: StorageMetrics,

    /// HTTP API metrics
    http_metrics: HttpMetrics,
}

/// Player and match metrics
#[derive(Clone)]
pub struct GameMetrics {
    /// Total players created
    pub players_created_total: IntCounter,

    /// Total matches simulated
    pub matches_played_total: IntCounter,

    /// Number of hits exchanged before a player failed
    pub rally_length: Histogram,

    /// Narrative lines per match
    pub narrative_lines: Histogram,

    /// Matches whose statistics could not be persisted
    pub statistics_update_failures_total: IntCounter,
}

/// Storage gateway metrics
#[derive(Clone)]
pub struct StorageMetrics {
    /// Storage operations by operation and outcome (ok, error, cancelled)
    pub operations_total: IntCounterVec,

    /// Time spent waiting on a storage operation
    pub operation_duration: HistogramVec,
}

/// HTTP API metrics
#[derive(Clone)]
pub struct HttpMetrics {
    /// Requests by route and status code
    pub requests_total: IntCounterVec,
}

impl MetricsCollector {
    /// Create a new metrics collector with its own registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let game_metrics = GameMetrics::new(&registry)?;
        let storage_metrics = StorageMetrics::new(&registry)?;
        let http_metrics = HttpMetrics::new(&registry)?;

        Ok(Self {
            registry,
            game_metrics,
            storage_metrics,
            http_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn game(&self) -> &GameMetrics {
        &self.game_metrics
    }

    pub fn storage(&self) -> &StorageMetrics {
        &self.storage_metrics
    }

    pub fn http(&self) -> &HttpMetrics {
        &self.http_metrics
    }

    pub fn record_player_created(&self) {
        self.game_metrics.players_created_total.inc();
    }

    /// Record a finished match from its narrative
    pub fn record_match_played(&self, narrative_lines: usize, rally_length: usize) {
        self.game_metrics.matches_played_total.inc();
        self.game_metrics
            .narrative_lines
            .observe(narrative_lines as f64);
        self.game_metrics.rally_length.observe(rally_length as f64);
    }

    pub fn record_statistics_update_failure(&self) {
        self.game_metrics.statistics_update_failures_total.inc();
    }

    /// Record one storage operation
    pub fn record_storage_operation(&self, operation: &str, outcome: &str, duration: Duration) {
        self.storage_metrics
            .operations_total
            .with_label_values(&[operation, outcome])
            .inc();
        self.storage_metrics
            .operation_duration
            .with_label_values(&[operation])
            .observe(duration.as_secs_f64());
    }

    pub fn record_http_request(&self, route: &str, status: u16) {
        let status = status.to_string();
        self.http_metrics
            .requests_total
            .with_label_values(&[route, status.as_str()])
            .inc();
    }

    /// Render all metrics in the Prometheus text format
    pub fn encode_text(&self) -> Result<String> {
        use prometheus::{Encoder, TextEncoder};

        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl GameMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let players_created_total = IntCounter::with_opts(Opts::new(
            "paddle_room_players_created_total",
            "Total number of players created",
        ))?;
        registry.register(Box::new(players_created_total.clone()))?;

        let matches_played_total = IntCounter::with_opts(Opts::new(
            "paddle_room_matches_played_total",
            "Total number of simulated matches",
        ))?;
        registry.register(Box::new(matches_played_total.clone()))?;

        let rally_length = Histogram::with_opts(
            HistogramOpts::new(
                "paddle_room_rally_length",
                "Number of hits exchanged before a player failed the ball",
            )
            .buckets(vec![1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 200.0, 500.0]),
        )?;
        registry.register(Box::new(rally_length.clone()))?;

        let narrative_lines = Histogram::with_opts(
            HistogramOpts::new(
                "paddle_room_narrative_lines",
                "Number of narrative lines per match report",
            )
            .buckets(vec![2.0, 5.0, 10.0, 25.0, 50.0, 100.0, 200.0, 500.0]),
        )?;
        registry.register(Box::new(narrative_lines.clone()))?;

        let statistics_update_failures_total = IntCounter::with_opts(Opts::new(
            "paddle_room_statistics_update_failures_total",
            "Matches whose win/loss counters could not be persisted",
        ))?;
        registry.register(Box::new(statistics_update_failures_total.clone()))?;

        Ok(Self {
            players_created_total,
            matches_played_total,
            rally_length,
            narrative_lines,
            statistics_update_failures_total,
        })
    }
}

impl StorageMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let operations_total = IntCounterVec::new(
            Opts::new(
                "paddle_room_storage_operations_total",
                "Storage operations by operation and outcome",
            ),
            &["operation", "outcome"],
        )?;
        registry.register(Box::new(operations_total.clone()))?;

        let operation_duration = HistogramVec::new(
            HistogramOpts::new(
                "paddle_room_storage_operation_duration_seconds",
                "Time spent waiting on storage operations",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["operation"],
        )?;
        registry.register(Box::new(operation_duration.clone()))?;

        Ok(Self {
            operations_total,
            operation_duration,
        })
    }
}

impl HttpMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let requests_total = IntCounterVec::new(
            Opts::new(
                "paddle_room_http_requests_total",
                "HTTP requests by route and status code",
            ),
            &["route", "status"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        Ok(Self { requests_total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collector_creation() {
        let collector = MetricsCollector::new().unwrap();
        assert_eq!(collector.game().matches_played_total.get(), 0);
        assert_eq!(collector.game().players_created_total.get(), 0);
    }

    #[test]
    fn test_record_match_played() {
        let collector = MetricsCollector::new().unwrap();
        collector.record_match_played(12, 10);
        collector.record_match_played(3, 1);

        assert_eq!(collector.game().matches_played_total.get(), 2);
        assert_eq!(collector.game().rally_length.get_sample_count(), 2);
        assert_eq!(collector.game().narrative_lines.get_sample_sum(), 15.0);
    }

    #[test]
    fn test_record_storage_operation() {
        let collector = MetricsCollector::new().unwrap();
        collector.record_storage_operation("save", "ok", Duration::from_millis(1));
        collector.record_storage_operation("save", "cancelled", Duration::from_millis(5));
        collector.record_storage_operation("save", "ok", Duration::from_millis(1));

        let ok = collector
            .storage()
            .operations_total
            .with_label_values(&["save", "ok"])
            .get();
        assert_eq!(ok, 2);
    }

    #[test]
    fn test_encode_text_contains_prefix() {
        let collector = MetricsCollector::new().unwrap();
        collector.record_player_created();
        collector.record_http_request("/players", 200);

        let text = collector.encode_text().unwrap();
        assert!(text.contains("paddle_room_players_created_total 1"));
        assert!(text.contains("paddle_room_http_requests_total"));
    }
}
