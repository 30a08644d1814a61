//! Player use cases
//!
//! Creation, lookup, listing and statistics updates on top of a
//! [`PlayerRepository`]. Storage failures are wrapped with a message naming
//! the use case; validation failures are returned as they are.

use crate::error::Result;
use crate::metrics::MetricsCollector;
use crate::player::validation::validate_player;
use crate::storage::{PlayerRepository, RequestContext};
use crate::types::{Player, PlayerId, PlayerStatistics};
use anyhow::Context;
use std::sync::Arc;
use tracing::{debug, info};

/// Player operations shared by the HTTP handlers and the match service
#[derive(Clone)]
pub struct PlayerService {
    repository: Arc<dyn PlayerRepository>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl PlayerService {
    pub fn new(repository: Arc<dyn PlayerRepository>) -> Self {
        Self {
            repository,
            metrics: None,
        }
    }

    pub fn with_metrics(
        repository: Arc<dyn PlayerRepository>,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            repository,
            metrics: Some(metrics),
        }
    }

    /// Create and store a new player, returning its id
    pub async fn create(
        &self,
        ctx: &RequestContext,
        names: &str,
        wins: i64,
        losses: i64,
    ) -> Result<PlayerId> {
        let player = Player::with_statistics(names, wins, losses);
        validate_player(&player)?;

        let id = player.id.clone();
        self.repository
            .save(ctx, player)
            .await
            .context("Player cannot be stored")?;

        if let Some(metrics) = &self.metrics {
            metrics.record_player_created();
        }
        info!(player_id = %id, names, "Player created");
        Ok(id)
    }

    /// Look up a player; an empty id yields the zero value without a storage call
    pub async fn find_by_id(&self, ctx: &RequestContext, id: &str) -> Result<Player> {
        if id.is_empty() {
            debug!("Empty player id requested, returning zero value");
            return Ok(Player::default());
        }

        self.repository
            .find_by_id(ctx, id)
            .await
            .with_context(|| format!("player with id {} could not be searched", id))
    }

    pub async fn find_all(&self, ctx: &RequestContext, sorted: bool) -> Result<Vec<Player>> {
        self.repository
            .find_all(ctx, sorted)
            .await
            .context("all players could not be searched")
    }

    /// Apply a finished match to both players' counters, winner first
    pub async fn update_statistics(
        &self,
        ctx: &RequestContext,
        statistics: &PlayerStatistics,
    ) -> Result<()> {
        self.repository
            .update_wins(ctx, &statistics.winner_id, statistics.wins)
            .await
            .context("winner player could not be updated")?;

        self.repository
            .update_defeats(ctx, &statistics.loser_id, statistics.losses)
            .await
            .context("loser player could not be updated")?;

        debug!(
            winner_id = %statistics.winner_id,
            loser_id = %statistics.loser_id,
            "Player statistics updated"
        );
        Ok(())
    }
}
