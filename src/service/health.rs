//! Health checks for the running service

use crate::service::app::AppState;
use crate::storage::{PlayerRepository, RequestContext};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Storage probes give up after this long
const STORAGE_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Health check status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Degraded => write!(f, "degraded"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: HealthStatus,
    pub service: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub uptime_seconds: u64,
    pub players: usize,
    pub checks: Vec<ComponentCheck>,
}

/// Individual component health check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentCheck {
    pub name: String,
    pub status: HealthStatus,
    pub message: Option<String>,
    pub duration_ms: u64,
}

impl HealthCheck {
    /// Check every component of the service
    pub async fn check(app_state: &AppState) -> Self {
        let checks = vec![
            Self::check_service_running(app_state).await,
            Self::check_storage(app_state).await,
        ];

        let status = if checks.iter().any(|c| c.status == HealthStatus::Unhealthy) {
            HealthStatus::Unhealthy
        } else if checks.iter().any(|c| c.status == HealthStatus::Degraded) {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };
        debug!(%status, "Health check finished");

        Self {
            status,
            service: app_state.config().service.name.clone(),
            version: crate::VERSION.to_string(),
            timestamp: chrono::Utc::now(),
            uptime_seconds: app_state.uptime().as_secs(),
            players: app_state.player_count(),
            checks,
        }
    }

    async fn check_service_running(app_state: &AppState) -> ComponentCheck {
        let start = Instant::now();
        let running = app_state.is_running().await;

        ComponentCheck {
            name: "service".to_string(),
            status: if running {
                HealthStatus::Healthy
            } else {
                HealthStatus::Unhealthy
            },
            message: (!running).then(|| "Service is not running".to_string()),
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// A listing must come back within the probe timeout
    async fn check_storage(app_state: &AppState) -> ComponentCheck {
        let start = Instant::now();
        let ctx = RequestContext::with_timeout(STORAGE_PROBE_TIMEOUT);

        let (status, message) = match app_state.repository().find_all(&ctx, false).await {
            Ok(_) => (HealthStatus::Healthy, None),
            Err(e) => {
                error!("Storage health check failed: {:#}", e);
                (HealthStatus::Unhealthy, Some(e.to_string()))
            }
        };

        ComponentCheck {
            name: "storage".to_string(),
            status,
            message,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }
}
