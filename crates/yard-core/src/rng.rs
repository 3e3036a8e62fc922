//! Deterministic per-train RNG for retry backoff.
//!
//! # Determinism strategy
//!
//! Each train gets its own independent `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (train_number * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive train numbers uniformly across the seed space.
//! Trains never share RNG state, so drawing a backoff interval needs no
//! synchronisation even though every train runs on its own worker.
//!
//! Thread interleaving still decides *when* each draw happens, so a run is
//! not reproducible end to end; only each train's sequence of backoff
//! intervals is.

use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::TrainNumber;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Per-train deterministic RNG.
///
/// Owned by the train agent and moved with it onto its worker thread.
#[derive(Debug)]
pub struct TrainRng(SmallRng);

impl TrainRng {
    /// Seed deterministically from the run's global seed and a train number.
    pub fn new(global_seed: u64, train: TrainNumber) -> Self {
        let seed = global_seed ^ (train.0 as u64).wrapping_mul(MIXING_CONSTANT);
        TrainRng(SmallRng::seed_from_u64(seed))
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Uniform backoff interval in `[min, max]`, at millisecond resolution.
    ///
    /// If `min > max` the bounds are swapped rather than panicking.
    pub fn backoff(&mut self, min: Duration, max: Duration) -> Duration {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        let lo_ms = lo.as_millis() as u64;
        let hi_ms = hi.as_millis() as u64;
        Duration::from_millis(self.0.gen_range(lo_ms..=hi_ms))
    }
}
