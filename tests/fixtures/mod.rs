//! Test fixtures and repository doubles for integration testing

#![allow(dead_code)]

use async_trait::async_trait;
use paddle_room::error::{ArenaError, Result};
use paddle_room::game::Referee;
use paddle_room::storage::{InMemoryPlayerRepository, PlayerRepository, RequestContext};
use paddle_room::types::Player;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn ctx() -> RequestContext {
    RequestContext::with_timeout(Duration::from_secs(5))
}

/// The players used across the integration tests
pub fn table_tennis_players() -> Vec<Player> {
    vec![
        Player::with_statistics("Ma Long", 10, 13),
        Player::with_statistics("Xu Xin", 20, 5),
        Player::with_statistics("Timo Boll", 7, 7),
        Player::with_statistics("Jan-Ove Waldner", 30, 2),
    ]
}

/// Repository pre-loaded with `players`
pub async fn seeded_repository(players: &[Player]) -> Arc<InMemoryPlayerRepository> {
    let repository = Arc::new(InMemoryPlayerRepository::new(players.len()));
    for player in players {
        repository
            .save(&ctx(), player.clone())
            .await
            .expect("fixture player should be stored");
    }
    repository
}

/// Referee that plays back fixed draws, then fails every ball
pub struct ScriptedReferee {
    draws: Mutex<VecDeque<u32>>,
}

impl ScriptedReferee {
    pub fn new(draws: &[u32]) -> Arc<Self> {
        Arc::new(Self {
            draws: Mutex::new(draws.iter().copied().collect()),
        })
    }
}

impl Referee for ScriptedReferee {
    fn draw(&self) -> u32 {
        self.draws
            .lock()
            .map(|mut draws| draws.pop_front())
            .ok()
            .flatten()
            .unwrap_or(paddle_room::game::FATAL_NUMBER)
    }
}

/// Repository whose reads work and whose counter updates always fail
pub struct FailingUpdatesRepository {
    inner: Arc<InMemoryPlayerRepository>,
    update_attempts: AtomicUsize,
}

impl FailingUpdatesRepository {
    pub fn new(inner: Arc<InMemoryPlayerRepository>) -> Self {
        Self {
            inner,
            update_attempts: AtomicUsize::new(0),
        }
    }

    pub fn update_attempts(&self) -> usize {
        self.update_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlayerRepository for FailingUpdatesRepository {
    async fn save(&self, ctx: &RequestContext, player: Player) -> Result<()> {
        self.inner.save(ctx, player).await
    }

    async fn find_by_id(&self, ctx: &RequestContext, id: &str) -> Result<Player> {
        self.inner.find_by_id(ctx, id).await
    }

    async fn find_all(&self, ctx: &RequestContext, sorted: bool) -> Result<Vec<Player>> {
        self.inner.find_all(ctx, sorted).await
    }

    async fn update_wins(&self, _ctx: &RequestContext, id: &str, _wins: i64) -> Result<()> {
        self.update_attempts.fetch_add(1, Ordering::SeqCst);
        Err(ArenaError::InternalError {
            message: format!("update of {} rejected", id),
        }
        .into())
    }

    async fn update_defeats(&self, _ctx: &RequestContext, id: &str, _defeats: i64) -> Result<()> {
        self.update_attempts.fetch_add(1, Ordering::SeqCst);
        Err(ArenaError::InternalError {
            message: format!("update of {} rejected", id),
        }
        .into())
    }
}

/// Repository that never answers; every call ends when its context fires
#[derive(Debug, Default)]
pub struct StallingRepository;

impl StallingRepository {
    async fn stall<T>(ctx: &RequestContext, operation: &str) -> Result<T> {
        let reason = ctx.done().await;
        Err(reason.into_arena_error(operation).into())
    }
}

#[async_trait]
impl PlayerRepository for StallingRepository {
    async fn save(&self, ctx: &RequestContext, _player: Player) -> Result<()> {
        Self::stall(ctx, "save").await
    }

    async fn find_by_id(&self, ctx: &RequestContext, _id: &str) -> Result<Player> {
        Self::stall(ctx, "find_by_id").await
    }

    async fn find_all(&self, ctx: &RequestContext, _sorted: bool) -> Result<Vec<Player>> {
        Self::stall(ctx, "find_all").await
    }

    async fn update_wins(&self, ctx: &RequestContext, _id: &str, _wins: i64) -> Result<()> {
        Self::stall(ctx, "update_wins").await
    }

    async fn update_defeats(&self, ctx: &RequestContext, _id: &str, _defeats: i64) -> Result<()> {
        Self::stall(ctx, "update_defeats").await
    }
}
