//! Backoff options, defaults, and the resolved configuration.
//!
//! [`BackoffOptions`] is what callers fill in. Every field is optional so that "unset" can be
//! told apart from an explicit value (an explicit `max_jitter(0.0)` disables jitter, an unset
//! jitter uses the default). Options are resolved exactly once, against a [`Defaults`] value,
//! into an immutable [`BackoffConfig`]:
//!
//! - `min_delay` of zero → default.
//! - `max_delay` of zero → default.
//! - `min_delay > max_delay` → both bounds reset to their defaults.
//! - `delay_factor < 1` or non-finite → default.
//! - `max_jitter` unset → default; otherwise clamped into `[0, 1]`.
//! - `max_attempts` unset → default; negative → unlimited.
//! - `on_wait` unset → [`UntilFired`].
//!
//! Injected [`Defaults`] go through the same checks, falling back to [`Defaults::STANDARD`].
//!
//! Resolution never mutates the options and is idempotent.
//!
//! ```rust
//! use std::time::Duration;
//! use rebound::{AttemptLimit, BackoffOptions};
//!
//! let config = BackoffOptions::new()
//!     .min_delay(Duration::from_secs(2))
//!     .max_delay(Duration::from_secs(1)) // inverted: both bounds fall back to defaults
//!     .max_attempts(-1)
//!     .resolve();
//! assert_eq!(config.min_delay(), Duration::from_millis(100));
//! assert_eq!(config.max_delay(), Duration::from_secs(100));
//! assert_eq!(config.max_attempts(), AttemptLimit::Unlimited);
//! ```

use crate::wait::{UntilFired, WaitStrategy};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default values applied to unset or invalid options.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Defaults {
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub delay_factor: f64,
    pub max_jitter: f64,
    pub max_attempts: usize,
}

impl Defaults {
    /// 100ms floor, 100s ceiling, factor 2, ±100% jitter, 100 attempts.
    pub const STANDARD: Defaults = Defaults {
        min_delay: Duration::from_millis(100),
        max_delay: Duration::from_secs(100),
        delay_factor: 2.0,
        max_jitter: 1.0,
        max_attempts: 100,
    };
}

impl Defaults {
    /// Replace every field that breaks the configuration invariants with its
    /// [`Defaults::STANDARD`] value. Jitter is clamped into `[0, 1]`.
    pub fn sanitized(&self) -> Defaults {
        let standard = Self::STANDARD;
        let nonzero = |d: Duration, fallback: Duration| if d.is_zero() { fallback } else { d };
        let mut min_delay = nonzero(self.min_delay, standard.min_delay);
        let mut max_delay = nonzero(self.max_delay, standard.max_delay);
        if min_delay > max_delay {
            min_delay = standard.min_delay;
            max_delay = standard.max_delay;
        }
        let delay_factor = if self.delay_factor.is_finite() && self.delay_factor >= 1.0 {
            self.delay_factor
        } else {
            standard.delay_factor
        };
        let max_jitter =
            if self.max_jitter.is_nan() { 0.0 } else { self.max_jitter.clamp(0.0, 1.0) };
        Defaults { min_delay, max_delay, delay_factor, max_jitter, max_attempts: self.max_attempts }
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Upper bound on the number of backoff attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AttemptLimit {
    Limited(usize),
    Unlimited,
}

impl AttemptLimit {
    /// Interpret a signed count: negative values mean unlimited.
    pub fn from_signed(n: i64) -> Self {
        if n < 0 {
            AttemptLimit::Unlimited
        } else {
            AttemptLimit::Limited(usize::try_from(n).unwrap_or(usize::MAX))
        }
    }

    /// `true` once `used` attempts reach the limit.
    pub fn is_reached(&self, used: usize) -> bool {
        match self {
            AttemptLimit::Limited(max) => used >= *max,
            AttemptLimit::Unlimited => false,
        }
    }

    /// The finite limit, if any.
    pub fn get(&self) -> Option<usize> {
        match self {
            AttemptLimit::Limited(max) => Some(*max),
            AttemptLimit::Unlimited => None,
        }
    }

    fn to_signed(self) -> i64 {
        match self {
            AttemptLimit::Limited(max) => i64::try_from(max).unwrap_or(i64::MAX),
            AttemptLimit::Unlimited => -1,
        }
    }
}

/// Caller-facing backoff options. Unset fields fall back to [`Defaults`].
#[derive(Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BackoffOptions {
    min_delay: Option<Duration>,
    max_delay: Option<Duration>,
    delay_factor: Option<f64>,
    max_jitter: Option<f64>,
    max_attempts: Option<i64>,
    #[cfg_attr(feature = "serde", serde(skip))]
    on_wait: Option<Arc<dyn WaitStrategy>>,
}

impl fmt::Debug for BackoffOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackoffOptions")
            .field("min_delay", &self.min_delay)
            .field("max_delay", &self.max_delay)
            .field("delay_factor", &self.delay_factor)
            .field("max_jitter", &self.max_jitter)
            .field("max_attempts", &self.max_attempts)
            .field("on_wait", &self.on_wait)
            .finish()
    }
}

impl BackoffOptions {
    /// Options with every field unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Floor of the delay sequence. Zero means "use the default".
    pub fn min_delay(mut self, delay: Duration) -> Self {
        self.min_delay = Some(delay);
        self
    }

    /// Ceiling of the delay sequence. Zero means "use the default".
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = Some(delay);
        self
    }

    /// Growth factor per step. Values below 1 mean "use the default".
    pub fn delay_factor(mut self, factor: f64) -> Self {
        self.delay_factor = Some(factor);
        self
    }

    /// Maximum symmetric jitter as a fraction of the delay. `0` (or negative) disables jitter.
    pub fn max_jitter(mut self, jitter: f64) -> Self {
        self.max_jitter = Some(jitter);
        self
    }

    /// Attempt ceiling. Negative means unlimited.
    pub fn max_attempts(mut self, attempts: i64) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Remove the attempt ceiling.
    pub fn unlimited_attempts(self) -> Self {
        self.max_attempts(-1)
    }

    /// Wait strategy used for each backoff step.
    pub fn on_wait<W>(mut self, strategy: W) -> Self
    where
        W: WaitStrategy + 'static,
    {
        self.on_wait = Some(Arc::new(strategy));
        self
    }

    /// Wait strategy from a shared handle.
    pub fn on_wait_arc(mut self, strategy: Arc<dyn WaitStrategy>) -> Self {
        self.on_wait = Some(strategy);
        self
    }

    /// Resolve against [`Defaults::STANDARD`].
    pub fn resolve(&self) -> BackoffConfig {
        self.resolve_with(&Defaults::STANDARD)
    }

    /// Resolve against the given defaults.
    /// Invalid fields in `defaults` are replaced as by [`Defaults::sanitized`].
    pub fn resolve_with(&self, defaults: &Defaults) -> BackoffConfig {
        let defaults = &defaults.sanitized();
        let mut min_delay = self.min_delay.filter(|d| !d.is_zero()).unwrap_or(defaults.min_delay);
        let mut max_delay = self.max_delay.filter(|d| !d.is_zero()).unwrap_or(defaults.max_delay);
        if min_delay > max_delay {
            min_delay = defaults.min_delay;
            max_delay = defaults.max_delay;
        }

        let delay_factor = self
            .delay_factor
            .filter(|f| f.is_finite() && *f >= 1.0)
            .unwrap_or(defaults.delay_factor);

        let max_jitter = match self.max_jitter {
            None => defaults.max_jitter,
            Some(j) if j.is_nan() || j <= 0.0 => 0.0,
            Some(j) => j.min(1.0),
        };

        let max_attempts = match self.max_attempts {
            None => AttemptLimit::Limited(defaults.max_attempts),
            Some(n) => AttemptLimit::from_signed(n),
        };

        let on_wait = self.on_wait.clone().unwrap_or_else(|| Arc::new(UntilFired));

        BackoffConfig { min_delay, max_delay, delay_factor, max_jitter, max_attempts, on_wait }
    }
}

/// Resolved, immutable backoff configuration.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BackoffConfig {
    min_delay: Duration,
    max_delay: Duration,
    delay_factor: f64,
    max_jitter: f64,
    max_attempts: AttemptLimit,
    #[cfg_attr(feature = "serde", serde(skip))]
    on_wait: Arc<dyn WaitStrategy>,
}

impl fmt::Debug for BackoffConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackoffConfig")
            .field("min_delay", &self.min_delay)
            .field("max_delay", &self.max_delay)
            .field("delay_factor", &self.delay_factor)
            .field("max_jitter", &self.max_jitter)
            .field("max_attempts", &self.max_attempts)
            .field("on_wait", &self.on_wait)
            .finish()
    }
}

impl PartialEq for BackoffConfig {
    /// Compares the numeric settings and the identity of the wait strategy.
    fn eq(&self, other: &Self) -> bool {
        self.min_delay == other.min_delay
            && self.max_delay == other.max_delay
            && self.delay_factor == other.delay_factor
            && self.max_jitter == other.max_jitter
            && self.max_attempts == other.max_attempts
            && Arc::ptr_eq(&self.on_wait, &other.on_wait)
    }
}

impl BackoffConfig {
    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    pub fn delay_factor(&self) -> f64 {
        self.delay_factor
    }

    pub fn max_jitter(&self) -> f64 {
        self.max_jitter
    }

    pub fn max_attempts(&self) -> AttemptLimit {
        self.max_attempts
    }

    pub fn on_wait(&self) -> &Arc<dyn WaitStrategy> {
        &self.on_wait
    }

    /// Turn the resolved values back into explicit options.
    pub fn to_options(&self) -> BackoffOptions {
        BackoffOptions {
            min_delay: Some(self.min_delay),
            max_delay: Some(self.max_delay),
            delay_factor: Some(self.delay_factor),
            max_jitter: Some(self.max_jitter),
            max_attempts: Some(self.max_attempts.to_signed()),
            on_wait: Some(self.on_wait.clone()),
        }
    }
}

impl From<BackoffConfig> for BackoffOptions {
    fn from(config: BackoffConfig) -> Self {
        config.to_options()
    }
}
