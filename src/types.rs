//! Common types used throughout the player tracking service

use crate::utils::{current_timestamp, generate_match_id, generate_player_id};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for players
pub type PlayerId = String;

/// Unique identifier for match reports
pub type MatchId = String;

/// A table-tennis player with its win/loss record
///
/// `Player::default()` is the zero value returned by lookups that found nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: PlayerId,
    #[serde(default)]
    pub names: String,
    #[serde(default)]
    pub wins: i64,
    #[serde(default)]
    pub losses: i64,
    #[serde(default)]
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub updated: DateTime<Utc>,
}

impl Player {
    /// Create a new player with no recorded games
    pub fn new(names: impl Into<String>) -> Self {
        Self::with_statistics(names, 0, 0)
    }

    /// Create a new player with a fresh id and the given record
    pub fn with_statistics(names: impl Into<String>, wins: i64, losses: i64) -> Self {
        let now = current_timestamp();
        Self {
            id: generate_player_id(),
            names: names.into(),
            wins,
            losses,
            created: now,
            updated: now,
        }
    }

    /// Whether this is the zero value (no stored player behind it)
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }
}

/// Report of a simulated match between two players
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchReport {
    pub id: MatchId,
    pub narrative: Vec<String>,
    pub winner: Player,
    pub loser: Player,
    pub created: DateTime<Utc>,
}

impl MatchReport {
    /// Build a report for a finished match
    pub fn new(winner: Player, loser: Player, narrative: Vec<String>) -> Self {
        Self {
            id: generate_match_id(),
            narrative,
            winner,
            loser,
            created: current_timestamp(),
        }
    }
}

/// Counter increments to apply to the two players after a match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStatistics {
    pub winner_id: PlayerId,
    pub loser_id: PlayerId,
    pub wins: i64,
    pub losses: i64,
}

impl PlayerStatistics {
    pub fn new(winner_id: PlayerId, loser_id: PlayerId, wins: i64, losses: i64) -> Self {
        Self {
            winner_id,
            loser_id,
            wins,
            losses,
        }
    }

    /// One win for the winner, one loss for the loser
    pub fn for_match(report: &MatchReport) -> Self {
        Self::new(report.winner.id.clone(), report.loser.id.clone(), 1, 1)
    }
}
