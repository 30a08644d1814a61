//! Match orchestration
//!
//! Looks both players up, runs the simulation and applies the result to their
//! statistics. A failed statistics update is logged and counted, and the
//! report is still returned.

use crate::error::{ArenaError, Result};
use crate::game::engine::MatchEngine;
use crate::metrics::MetricsCollector;
use crate::player::PlayerService;
use crate::storage::RequestContext;
use crate::types::{MatchReport, Player, PlayerStatistics};
use anyhow::Context;
use std::sync::Arc;
use tracing::{error, info};

pub const SAME_PLAYER: &str = "A player cannot play a match against itself";

#[derive(Clone)]
pub struct MatchService {
    players: PlayerService,
    engine: MatchEngine,
    metrics: Option<Arc<MetricsCollector>>,
}

impl MatchService {
    pub fn new(players: PlayerService, engine: MatchEngine) -> Self {
        Self {
            players,
            engine,
            metrics: None,
        }
    }

    pub fn with_metrics(
        players: PlayerService,
        engine: MatchEngine,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            players,
            engine,
            metrics: Some(metrics),
        }
    }

    /// Simulate a match between two stored players
    pub async fn play(
        &self,
        ctx: &RequestContext,
        player1_id: &str,
        player2_id: &str,
    ) -> Result<MatchReport> {
        if player1_id == player2_id {
            return Err(ArenaError::Validation {
                message: SAME_PLAYER.to_string(),
            }
            .into());
        }

        let player1 = self
            .participant(ctx, player1_id)
            .await
            .context("player 1 not found at the match")?;
        let player2 = self
            .participant(ctx, player2_id)
            .await
            .context("player 2 not found at the match")?;

        let report = self.engine.simulate(player1, player2).await;

        let statistics = PlayerStatistics::for_match(&report);
        if let Err(e) = self.players.update_statistics(ctx, &statistics).await {
            error!(
                match_id = %report.id,
                winner_id = %statistics.winner_id,
                loser_id = %statistics.loser_id,
                "Player statistics were not updated: {:#}", e
            );
            if let Some(metrics) = &self.metrics {
                metrics.record_statistics_update_failure();
            }
        }

        if let Some(metrics) = &self.metrics {
            let lines = report.narrative.len();
            metrics.record_match_played(lines, lines.saturating_sub(2));
        }
        info!(
            match_id = %report.id,
            winner = %report.winner.names,
            loser = %report.loser.names,
            "Match played"
        );
        Ok(report)
    }

    /// A stored player; the zero value counts as not found
    async fn participant(&self, ctx: &RequestContext, id: &str) -> Result<Player> {
        let player = self.players.find_by_id(ctx, id).await?;
        if player.is_empty() {
            return Err(ArenaError::PlayerNotFound {
                player_id: id.to_string(),
            }
            .into());
        }
        Ok(player)
    }
}
