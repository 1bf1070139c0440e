//! Symmetric jitter to prevent thundering herd
//!
//! A jitter of `j` moves a delay `d` to a value drawn uniformly from `[d * (1 - j), d * (1 + j)]`.
//! `j = 0` leaves the delay untouched and draws nothing from the RNG.
//!
//! Notes:
//! - RNG: always injected, so a seeded `StdRng` makes the sequence reproducible.
//! - Precision: arithmetic is done on nanoseconds as `f64`; values that cannot be represented
//!   as a `Duration` saturate instead of panicking.
//!
//! Example:
//! ```rust
//! use rand::{rngs::StdRng, SeedableRng};
//! use rebound::Jitter;
//! use std::time::Duration;
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let jittered = Jitter::symmetric(0.5).apply_with_rng(Duration::from_millis(100), &mut rng);
//! assert!(jittered >= Duration::from_millis(50));
//! assert!(jittered <= Duration::from_millis(150));
//! ```

use rand::Rng;
use std::time::Duration;

/// Fractional jitter applied symmetrically around a delay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Jitter {
    max: f64,
}

impl Jitter {
    /// No jitter - use exact delay
    pub const NONE: Jitter = Jitter { max: 0.0 };

    /// Jitter of up to `±max` of the delay. Negative or NaN values disable jitter.
    pub fn symmetric(max: f64) -> Self {
        if max.is_nan() || max <= 0.0 {
            Self::NONE
        } else {
            Self { max }
        }
    }

    /// The configured fraction.
    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn is_none(&self) -> bool {
        self.max <= 0.0
    }

    /// Apply jitter with the given RNG.
    pub fn apply_with_rng<R: Rng>(&self, delay: Duration, rng: &mut R) -> Duration {
        if self.is_none() {
            return delay;
        }
        let u: f64 = rng.random_range(-1.0..=1.0);
        let nanos = delay.as_nanos() as f64;
        from_nanos_saturating(nanos + nanos * self.max * u)
    }
}

/// Multiply a duration by a factor, returning `None` when the result does not fit.
pub(crate) fn scale(delay: Duration, factor: f64) -> Option<Duration> {
    let nanos = delay.as_nanos() as f64 * factor;
    if nanos.is_finite() && nanos < u64::MAX as f64 {
        Some(Duration::from_nanos(nanos.max(0.0) as u64))
    } else {
        None
    }
}

fn from_nanos_saturating(nanos: f64) -> Duration {
    if nanos.is_nan() || nanos <= 0.0 {
        Duration::ZERO
    } else if nanos >= u64::MAX as f64 {
        Duration::from_nanos(u64::MAX)
    } else {
        Duration::from_nanos(nanos as u64)
    }
}
