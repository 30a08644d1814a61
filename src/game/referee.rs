//! Random source deciding every touch of the ball
//!
//! Both actors of a match draw from the same referee. A seeded referee replays
//! the same sequence of draws, which makes a match reproducible as long as the
//! two actors interleave the same way.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Mutex;
use tracing::debug;

/// Upper bound (exclusive) of every draw
pub const DRAW_RANGE: u32 = 100;

/// Source of the numbers drawn on every touch of the ball
pub trait Referee: Send + Sync {
    /// Draw a number in `[0, DRAW_RANGE)`
    fn draw(&self) -> u32;
}

/// Referee backed by a ChaCha8 generator
pub struct SeededReferee {
    seed: Option<u64>,
    rng: Mutex<ChaCha8Rng>,
}

impl SeededReferee {
    /// A referee that replays the same draws for the same seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    /// A referee seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self {
            seed: None,
            rng: Mutex::new(ChaCha8Rng::from_entropy()),
        }
    }

    /// Seeded when a seed is configured, entropy otherwise
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => {
                debug!(seed, "Using seeded referee");
                Self::new(seed)
            }
            None => Self::from_entropy(),
        }
    }
}

impl Referee for SeededReferee {
    fn draw(&self) -> u32 {
        // A panic while holding the lock leaves the generator usable
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_range(0..DRAW_RANGE)
    }
}

impl std::fmt::Debug for SeededReferee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeededReferee")
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draws_stay_in_range() {
        let referee = SeededReferee::from_entropy();
        for _ in 0..10_000 {
            assert!(referee.draw() < DRAW_RANGE);
        }
        assert_eq!(format!("{:?}", referee), "SeededReferee { seed: None, .. }");
    }

    #[test]
    fn test_same_seed_replays_same_draws() {
        let first = SeededReferee::new(1);
        let second = SeededReferee::from_seed(Some(1));

        let a: Vec<u32> = (0..64).map(|_| first.draw()).collect();
        let b: Vec<u32> = (0..64).map(|_| second.draw()).collect();
        assert_eq!(a, b);
        assert_eq!(format!("{:?}", second), "SeededReferee { seed: Some(1), .. }");
    }

    #[test]
    fn test_different_seeds_diverge() {
        let first = SeededReferee::new(1);
        let second = SeededReferee::new(2);

        let a: Vec<u32> = (0..64).map(|_| first.draw()).collect();
        let b: Vec<u32> = (0..64).map(|_| second.draw()).collect();
        assert_ne!(a, b);
    }
}
