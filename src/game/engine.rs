//! Match simulation engine
//!
//! Two actors pass a ball over a table made of two rendezvous lanes. Each actor
//! owns the receiving end of its own lane and the sending end of its opponent's.
//! On every touch the holder asks the referee for a number; drawing
//! [`FATAL_NUMBER`] fails the ball, and the failing actor closes the table by
//! dropping its outbound lane. The opponent sees the closed lane on its next
//! receive and wins.
//!
//! Every actor reports what happens to a narrator over a small buffered
//! channel. The narrator collects lines in arrival order until both actors have
//! let go of their narrative senders.
//!
//! The winner normally comes from the won signals. If neither signal arrives,
//! for instance because an actor task panicked, the winner is decided from how
//! the actors left the table.

use crate::game::referee::{Referee, SeededReferee};
use crate::game::rendezvous::{self, RendezvousReceiver, RendezvousSender};
use crate::types::{MatchReport, Player};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Drawing this number fails the ball
pub const FATAL_NUMBER: u32 = 13;

/// Value of the ball served to player 1
pub const FIRST_BALL: u64 = 1;

/// Capacity of the narrative channel
pub const NARRATIVE_CAPACITY: usize = 2;

pub fn hit_sentence(names: &str) -> String {
    format!("{:?} hit the ball", names)
}

pub fn fail_sentence(names: &str) -> String {
    format!("{:?} fail the ball", names)
}

pub fn won_sentence(names: &str) -> String {
    format!("Player {:?} won", names)
}

/// How an actor left the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Won,
    Failed,
}

/// One side of the table
struct Actor {
    player: Player,
    inbound: RendezvousReceiver<u64>,
    outbound: RendezvousSender<u64>,
    narrative: mpsc::Sender<String>,
    won: oneshot::Sender<()>,
    referee: Arc<dyn Referee>,
}

impl Actor {
    async fn play(self) -> Outcome {
        let Actor {
            player,
            mut inbound,
            outbound,
            narrative,
            won,
            referee,
        } = self;

        loop {
            let Some(ball) = inbound.recv().await else {
                // The opponent closed the table
                let _ = narrative.send(won_sentence(&player.names)).await;
                drop(narrative);
                let _ = won.send(());
                return Outcome::Won;
            };

            if referee.draw() == FATAL_NUMBER {
                let _ = narrative.send(fail_sentence(&player.names)).await;
                drop(outbound);
                return Outcome::Failed;
            }

            let _ = narrative.send(hit_sentence(&player.names)).await;
            if outbound.send(ball + 1).await.is_err() {
                debug!(player_id = %player.id, "Opponent left the table before the hand-off");
            }
        }
    }
}

/// Runs one simulated match per call
#[derive(Clone)]
pub struct MatchEngine {
    referee: Arc<dyn Referee>,
}

impl MatchEngine {
    pub fn new(referee: Arc<dyn Referee>) -> Self {
        Self { referee }
    }

    /// Engine with a replayable referee
    pub fn seeded(seed: u64) -> Self {
        Self::new(Arc::new(SeededReferee::new(seed)))
    }

    /// Play a match until one side fails the ball
    pub async fn simulate(&self, player1: Player, player2: Player) -> MatchReport {
        info!(
            player1 = %player1.names,
            player2 = %player2.names,
            "Starting match simulation"
        );

        let (narrative_tx, mut narrative_rx) = mpsc::channel::<String>(NARRATIVE_CAPACITY);
        let narrator: JoinHandle<Vec<String>> = tokio::spawn(async move {
            let mut lines = Vec::new();
            while let Some(line) = narrative_rx.recv().await {
                lines.push(line);
            }
            lines
        });

        let (lane1_tx, lane1_rx) = rendezvous::channel();
        let (lane2_tx, lane2_rx) = rendezvous::channel();
        let serve = lane1_tx.clone();
        let (won1_tx, won1_rx) = oneshot::channel();
        let (won2_tx, won2_rx) = oneshot::channel();

        let actor1 = tokio::spawn(
            Actor {
                player: player1.clone(),
                inbound: lane1_rx,
                outbound: lane2_tx,
                narrative: narrative_tx.clone(),
                won: won1_tx,
                referee: self.referee.clone(),
            }
            .play(),
        );
        let actor2 = tokio::spawn(
            Actor {
                player: player2.clone(),
                inbound: lane2_rx,
                outbound: lane1_tx,
                narrative: narrative_tx,
                won: won2_tx,
                referee: self.referee.clone(),
            }
            .play(),
        );

        if serve.send(FIRST_BALL).await.is_err() {
            warn!(player_id = %player1.id, "Player 1 left the table before the serve");
        }
        drop(serve);

        let signalled = tokio::select! {
            Ok(()) = won1_rx => Some(true),
            Ok(()) = won2_rx => Some(false),
            else => None,
        };

        let narrative = narrator.await.unwrap_or_else(|e| {
            warn!("Narrator task failed: {}", e);
            Vec::new()
        });
        for (index, line) in narrative.iter().enumerate() {
            debug!(index, line = %line, "Narrative");
        }

        let first = actor1.await.ok();
        let second = actor2.await.ok();
        if first.is_some() && first == second {
            warn!(?first, "Both actors left the table the same way");
        }

        let player1_won = signalled.unwrap_or_else(|| {
            warn!(?first, ?second, "No won signal, deciding from the actor outcomes");
            player1_won_by_outcome(first, second)
        });

        let (winner, loser) = if player1_won {
            (player1, player2)
        } else {
            (player2, player1)
        };
        info!(
            winner = %winner.names,
            loser = %loser.names,
            lines = narrative.len(),
            "Match finished"
        );

        MatchReport::new(winner, loser, narrative)
    }
}

/// Player 1 wins if it won, or if player 2 failed; otherwise player 2 wins
fn player1_won_by_outcome(first: Option<Outcome>, second: Option<Outcome>) -> bool {
    first == Some(Outcome::Won) || second == Some(Outcome::Failed)
}

impl std::fmt::Debug for MatchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchEngine").finish_non_exhaustive()
    }
}
