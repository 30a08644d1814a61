//! Player repository interface

use crate::error::Result;
use crate::storage::context::RequestContext;
use crate::types::Player;
use async_trait::async_trait;

/// Trait for player storage operations
///
/// Every operation is bounded by the caller's [`RequestContext`]: once it fires
/// the call returns `Cancelled` or `DeadlineExceeded`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    /// Store a new player; fails with `AlreadyExists` for a duplicate id
    async fn save(&self, ctx: &RequestContext, player: Player) -> Result<()>;

    /// Look up a player. An unknown id yields `Player::default()`, not an error.
    async fn find_by_id(&self, ctx: &RequestContext, id: &str) -> Result<Player>;

    /// Every stored player; `sorted` orders them by names, descending
    async fn find_all(&self, ctx: &RequestContext, sorted: bool) -> Result<Vec<Player>>;

    /// Add `wins` to the player's win counter
    async fn update_wins(&self, ctx: &RequestContext, id: &str, wins: i64) -> Result<()>;

    /// Add `defeats` to the player's loss counter
    async fn update_defeats(&self, ctx: &RequestContext, id: &str, defeats: i64) -> Result<()>;
}
