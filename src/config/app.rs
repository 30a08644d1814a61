//! Main application configuration
//!
//! This module defines the primary configuration structures for the paddle-room
//! service, including environment variable loading, TOML files and validation.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub storage: StorageSettings,
    pub auth: AuthSettings,
    pub game: GameSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Log output format (text, json)
    pub log_format: String,
    /// Host the HTTP API binds to
    pub http_host: String,
    /// Port the HTTP API binds to
    pub http_port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
}

/// Player storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Initial capacity of the in-memory player map
    pub initial_capacity: usize,
    /// Deadline applied to every storage operation issued by a request
    pub operation_timeout_ms: u64,
}

/// Sign-in settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// HMAC secret used to sign tokens
    pub jwt_secret: String,
    /// Token lifetime in seconds
    pub token_ttl_seconds: u64,
    /// Known users and their passwords
    pub users: HashMap<String, String>,
}

/// Match simulation settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Seed for the referee; drawn from OS entropy when absent
    pub referee_seed: Option<u64>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "paddle-room".to_string(),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            http_host: "0.0.0.0".to_string(),
            http_port: 8287,
            shutdown_timeout_seconds: 30,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            initial_capacity: 5,
            operation_timeout_ms: 5000,
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        let mut users = HashMap::new();
        users.insert("user1".to_string(), "password1".to_string());
        users.insert("user2".to_string(), "password2".to_string());

        Self {
            jwt_secret: "my_secret_key".to_string(),
            token_ttl_seconds: 300, // 5 minutes
            users,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file; environment variables still override it
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }
        if let Ok(log_format) = env::var("LOG_FORMAT") {
            self.service.log_format = log_format;
        }
        if let Ok(host) = env::var("HTTP_HOST") {
            self.service.http_host = host;
        }
        if let Ok(port) = env::var("SERVICE_APP_PORT") {
            self.service.http_port = port
                .parse()
                .map_err(|_| anyhow!("Invalid SERVICE_APP_PORT value: {}", port))?;
        }
        if let Ok(timeout) = env::var("SHUTDOWN_TIMEOUT_SECONDS") {
            self.service.shutdown_timeout_seconds = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid SHUTDOWN_TIMEOUT_SECONDS value: {}", timeout))?;
        }

        // Storage settings
        if let Ok(capacity) = env::var("STORAGE_INITIAL_CAPACITY") {
            self.storage.initial_capacity = capacity
                .parse()
                .map_err(|_| anyhow!("Invalid STORAGE_INITIAL_CAPACITY value: {}", capacity))?;
        }
        if let Ok(timeout) = env::var("STORAGE_OPERATION_TIMEOUT_MS") {
            self.storage.operation_timeout_ms = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid STORAGE_OPERATION_TIMEOUT_MS value: {}", timeout))?;
        }

        // Auth settings
        if let Ok(secret) = env::var("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Ok(ttl) = env::var("TOKEN_TTL_SECONDS") {
            self.auth.token_ttl_seconds = ttl
                .parse()
                .map_err(|_| anyhow!("Invalid TOKEN_TTL_SECONDS value: {}", ttl))?;
        }

        // Game settings
        if let Ok(seed) = env::var("REFEREE_SEED") {
            self.game.referee_seed = Some(
                seed.parse()
                    .map_err(|_| anyhow!("Invalid REFEREE_SEED value: {}", seed))?,
            );
        }

        Ok(())
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.service.shutdown_timeout_seconds)
    }

    /// Get the per-request storage deadline as Duration
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.storage.operation_timeout_ms)
    }

    /// Get token lifetime as Duration
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.auth.token_ttl_seconds)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log settings
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }
    match config.service.log_format.to_lowercase().as_str() {
        "text" | "json" => {}
        _ => return Err(anyhow!("Invalid log format: {}", config.service.log_format)),
    }

    // Validate ports
    if config.service.http_port == 0 {
        return Err(anyhow!("HTTP port cannot be 0"));
    }

    // Validate timeouts
    if config.service.shutdown_timeout_seconds == 0 {
        return Err(anyhow!("Shutdown timeout must be greater than 0"));
    }
    if config.storage.operation_timeout_ms == 0 {
        return Err(anyhow!("Storage operation timeout must be greater than 0"));
    }

    // Validate auth settings
    if config.auth.jwt_secret.is_empty() {
        return Err(anyhow!("JWT secret cannot be empty"));
    }
    if config.auth.token_ttl_seconds == 0 {
        return Err(anyhow!("Token lifetime must be greater than 0"));
    }

    Ok(())
}
