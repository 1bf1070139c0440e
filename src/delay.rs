//! Delay engine: a bounded geometric sequence with jitter applied on read.
//!
//! Semantics:
//! - The first call to [`DelayEngine::next`] yields `min`.
//! - Every later call yields `min(previous * factor, max)`, where `previous` is the raw
//!   (pre-jitter) delay. Jitter never compounds across steps.
//! - Jitter is drawn from an RNG created lazily on the first jittered call and seeded once per
//!   engine from a [`Seed`].
//!
//! Example
//! ```rust
//! use std::time::Duration;
//! use rebound::{DelayEngine, Jitter, Seed};
//!
//! let mut engine = DelayEngine::new(Seed::Fixed(1));
//! let (min, max) = (Duration::from_millis(100), Duration::from_millis(300));
//! assert_eq!(engine.next(min, max, 2.5, Jitter::NONE), Duration::from_millis(100));
//! assert_eq!(engine.next(min, max, 2.5, Jitter::NONE), Duration::from_millis(250));
//! assert_eq!(engine.next(min, max, 2.5, Jitter::NONE), Duration::from_millis(300)); // capped
//! ```

use crate::jitter::{scale, Jitter};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Where the jitter RNG gets its seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Seed {
    /// Seed from the wall clock when the RNG is first needed.
    #[default]
    Clock,
    /// Fixed seed for reproducible sequences.
    Fixed(u64),
}

impl Seed {
    fn rng(self) -> StdRng {
        match self {
            Seed::Fixed(seed) => StdRng::seed_from_u64(seed),
            Seed::Clock => {
                let nanos = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_nanos() as u64)
                    .unwrap_or_default();
                StdRng::seed_from_u64(nanos)
            }
        }
    }
}

/// Stateful delay generator. One engine per retry session.
#[derive(Debug, Clone)]
pub struct DelayEngine {
    current: Option<Duration>,
    seed: Seed,
    rng: Option<StdRng>,
}

impl Default for DelayEngine {
    fn default() -> Self {
        Self::new(Seed::Clock)
    }
}

impl DelayEngine {
    pub fn new(seed: Seed) -> Self {
        Self { current: None, seed, rng: None }
    }

    /// Advance the sequence and return the jittered delay.
    ///
    /// Bounds are expected to be sanitized (`0 < min <= max`, `factor >= 1`).
    pub fn next(&mut self, min: Duration, max: Duration, factor: f64, jitter: Jitter) -> Duration {
        let raw = match self.current {
            None => min,
            Some(previous) => scale(previous, factor).map_or(max, |grown| grown.min(max)),
        };
        self.current = Some(raw);

        if jitter.is_none() {
            return raw;
        }
        let seed = self.seed;
        let rng = self.rng.get_or_insert_with(|| seed.rng());
        jitter.apply_with_rng(raw, rng)
    }

    /// The raw delay produced by the last call to `next`, if any.
    pub fn current(&self) -> Option<Duration> {
        self.current
    }

    /// Restart the sequence at `min`. The RNG keeps its stream.
    pub fn reset(&mut self) {
        self.current = None;
    }
}
