//! Application state and service wiring
//!
//! `AppState` owns every long-lived component of the service: configuration,
//! metrics, the player repository, the player and match services and the
//! sign-in components. It is built once at startup and shared with the HTTP
//! handlers behind an `Arc`.

use crate::auth::{Authenticator, BasicAuthenticator, TokenIssuer};
use crate::config::{validate_config, AppConfig};
use crate::game::{MatchEngine, MatchService, Referee, SeededReferee};
use crate::metrics::MetricsCollector;
use crate::player::PlayerService;
use crate::storage::{InMemoryPlayerRepository, PlayerRepository, RequestContext};
use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Service initialization error: {message}")]
    Initialization { message: String },

    #[error("HTTP server error: {message}")]
    Server { message: String },
}

/// Shared state of a running service
pub struct AppState {
    config: AppConfig,
    metrics: Arc<MetricsCollector>,
    repository: Arc<InMemoryPlayerRepository>,
    players: PlayerService,
    matches: MatchService,
    authenticator: Arc<dyn Authenticator>,
    tokens: TokenIssuer,
    started_at: Instant,
    is_running: RwLock<bool>,
}

impl AppState {
    /// Build the service from configuration
    pub fn new(config: AppConfig) -> Result<Self> {
        let referee = Arc::new(SeededReferee::from_seed(config.game.referee_seed));
        Self::with_referee(config, referee)
    }

    /// Build the service with a specific referee for the match engine
    pub fn with_referee(config: AppConfig, referee: Arc<dyn Referee>) -> Result<Self> {
        validate_config(&config).map_err(|e| ServiceError::Configuration {
            message: e.to_string(),
        })?;

        info!("Initializing {} components", config.service.name);

        let metrics = Arc::new(MetricsCollector::new().map_err(|e| {
            ServiceError::Initialization {
                message: format!("metrics registry: {}", e),
            }
        })?);
        debug!("Metrics collector initialized");

        let repository = Arc::new(InMemoryPlayerRepository::with_metrics(
            config.storage.initial_capacity,
            metrics.clone(),
        ));
        let players = PlayerService::with_metrics(repository.clone(), metrics.clone());
        let matches =
            MatchService::with_metrics(players.clone(), MatchEngine::new(referee), metrics.clone());
        debug!("Player and match services initialized");

        let authenticator: Arc<dyn Authenticator> =
            Arc::new(BasicAuthenticator::new(config.auth.users.clone()));
        let tokens = TokenIssuer::new(&config.auth.jwt_secret, config.token_ttl());
        debug!("Sign-in components initialized");

        Ok(Self {
            config,
            metrics,
            repository,
            players,
            matches,
            authenticator,
            tokens,
            started_at: Instant::now(),
            is_running: RwLock::new(false),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    pub fn repository(&self) -> Arc<dyn PlayerRepository> {
        self.repository.clone()
    }

    /// Number of stored players
    pub fn player_count(&self) -> usize {
        self.repository.len()
    }

    pub fn players(&self) -> &PlayerService {
        &self.players
    }

    pub fn matches(&self) -> &MatchService {
        &self.matches
    }

    pub fn authenticator(&self) -> Arc<dyn Authenticator> {
        self.authenticator.clone()
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// A context bounded by the configured operation timeout
    pub fn request_context(&self) -> RequestContext {
        RequestContext::with_timeout(self.config.operation_timeout())
    }

    pub fn uptime(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    /// Mark the service as accepting requests
    pub async fn start(&self) {
        *self.is_running.write().await = true;
        info!("{} marked as running", self.config.service.name);
    }

    pub async fn stop(&self) {
        *self.is_running.write().await = false;
        info!("{} marked as stopped", self.config.service.name);
    }

    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }
}
