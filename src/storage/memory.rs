//! In-memory player repository
//!
//! Each operation runs as its own spawned task against the shared map while the
//! caller races that task against its [`RequestContext`]. The map sits behind a
//! single `RwLock`, so insert-if-absent and counter read-modify-write are atomic
//! with respect to each other.
//!
//! When the context fires the caller returns at once and the task is left to
//! finish on its own. Mutating tasks check the context right before touching the
//! map and skip the write if it has already fired; a write that passed that
//! check can still land after the caller has seen the cancellation error.

use crate::error::{ArenaError, Result};
use crate::metrics::MetricsCollector;
use crate::storage::context::RequestContext;
use crate::storage::repository::PlayerRepository;
use crate::types::{Player, PlayerId};
use crate::utils::current_timestamp;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Instant;
use tracing::{debug, error, info};

type PlayerMap = Arc<RwLock<HashMap<PlayerId, Player>>>;

/// In-memory player repository
#[derive(Clone)]
pub struct InMemoryPlayerRepository {
    players: PlayerMap,
    metrics: Option<Arc<MetricsCollector>>,
}

impl InMemoryPlayerRepository {
    /// Create a new repository sized for `capacity` players
    pub fn new(capacity: usize) -> Self {
        info!(
            "Creating in-memory player repository with capacity {}",
            capacity
        );
        Self {
            players: Arc::new(RwLock::new(HashMap::with_capacity(capacity))),
            metrics: None,
        }
    }

    /// Create a repository that records operation outcomes
    pub fn with_metrics(capacity: usize, metrics: Arc<MetricsCollector>) -> Self {
        Self {
            metrics: Some(metrics),
            ..Self::new(capacity)
        }
    }

    /// Number of stored players
    pub fn len(&self) -> usize {
        self.players.read().map(|players| players.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `task` on its own tokio task and race it against `ctx`
    async fn race<T, F>(&self, ctx: &RequestContext, operation: &'static str, task: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(PlayerMap) -> Result<T> + Send + 'static,
    {
        let start = Instant::now();
        let players = self.players.clone();
        let handle = tokio::spawn(async move { task(players) });

        let result = tokio::select! {
            biased;
            reason = ctx.done() => {
                error!(
                    operation,
                    "Operation took too long to finish: {}", reason
                );
                Err(reason.into_arena_error(operation).into())
            }
            joined = handle => match joined {
                Ok(result) => result,
                Err(e) => Err(ArenaError::InternalError {
                    message: format!("{} task failed: {}", operation, e),
                }
                .into()),
            },
        };

        if let Some(metrics) = &self.metrics {
            let outcome = match &result {
                Ok(_) => "ok",
                Err(e) if crate::error::arena_error(e).is_some_and(|e| e.is_cancellation()) => {
                    "cancelled"
                }
                Err(_) => "error",
            };
            metrics.record_storage_operation(operation, outcome, start.elapsed());
        }

        result
    }

    /// Add `delta` to one of a player's counters
    async fn update_counter(
        &self,
        ctx: &RequestContext,
        operation: &'static str,
        id: &str,
        delta: i64,
        counter: fn(&mut Player) -> &mut i64,
    ) -> Result<()> {
        info!(player_id = %id, delta, "Updating player counter ({})", operation);
        let id = id.to_string();
        let task_ctx = ctx.clone();

        self.race(ctx, operation, move |players| {
            let mut players = players.write().map_err(|_| ArenaError::InternalError {
                message: "Failed to acquire players write lock".to_string(),
            })?;
            if let Some(reason) = task_ctx.error() {
                debug!(player_id = %id, "Skipping {} after context fired", operation);
                return Err(reason.into_arena_error(operation).into());
            }

            let player = players
                .get_mut(&id)
                .ok_or_else(|| ArenaError::PlayerNotFound {
                    player_id: id.clone(),
                })?;
            let slot = counter(player);
            let updated = slot
                .checked_add(delta)
                .filter(|value| *value >= 0)
                .ok_or_else(|| ArenaError::Validation {
                    message: format!(
                        "Player {} counter cannot be changed by {} from {}",
                        id, delta, slot
                    ),
                })?;
            *slot = updated;
            player.updated = current_timestamp();
            info!(player_id = %id, "Player was updated on repository");
            Ok(())
        })
        .await
    }
}

impl Default for InMemoryPlayerRepository {
    fn default() -> Self {
        Self::new(5)
    }
}

#[async_trait]
impl PlayerRepository for InMemoryPlayerRepository {
    async fn save(&self, ctx: &RequestContext, player: Player) -> Result<()> {
        info!(player_id = %player.id, names = %player.names, "Received player to store");
        let task_ctx = ctx.clone();

        self.race(ctx, "save", move |players| {
            let mut players = players.write().map_err(|_| ArenaError::InternalError {
                message: "Failed to acquire players write lock".to_string(),
            })?;
            if let Some(reason) = task_ctx.error() {
                debug!(player_id = %player.id, "Skipping save after context fired");
                return Err(reason.into_arena_error("save").into());
            }

            if players.contains_key(&player.id) {
                error!(player_id = %player.id, "Record already exists on repository");
                return Err(ArenaError::AlreadyExists {
                    player_id: player.id.clone(),
                }
                .into());
            }
            debug!(player_id = %player.id, "Saving player on repository");
            players.insert(player.id.clone(), player);
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, ctx: &RequestContext, id: &str) -> Result<Player> {
        info!(player_id = %id, "Looking for player");
        let id = id.to_string();

        let player = self
            .race(ctx, "find_by_id", move |players| {
                let players = players.read().map_err(|_| ArenaError::InternalError {
                    message: "Failed to acquire players read lock".to_string(),
                })?;
                Ok(players.get(&id).cloned().unwrap_or_default())
            })
            .await?;

        debug!(player_id = %player.id, found = !player.is_empty(), "Lookup finished");
        Ok(player)
    }

    async fn find_all(&self, ctx: &RequestContext, sorted: bool) -> Result<Vec<Player>> {
        info!(sorted, "Finding all players");

        let players = self
            .race(ctx, "find_all", move |players| {
                let players = players.read().map_err(|_| ArenaError::InternalError {
                    message: "Failed to acquire players read lock".to_string(),
                })?;
                let mut values: Vec<Player> = players.values().cloned().collect();
                if sorted {
                    // Names descending
                    values.sort_by(|a, b| b.names.cmp(&a.names));
                }
                Ok(values)
            })
            .await?;

        debug!(count = players.len(), "Found players on repository");
        Ok(players)
    }

    async fn update_wins(&self, ctx: &RequestContext, id: &str, wins: i64) -> Result<()> {
        self.update_counter(ctx, "update_wins", id, wins, |player| &mut player.wins)
            .await
    }

    async fn update_defeats(&self, ctx: &RequestContext, id: &str, defeats: i64) -> Result<()> {
        self.update_counter(ctx, "update_defeats", id, defeats, |player| {
            &mut player.losses
        })
        .await
    }
}
