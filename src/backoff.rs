//! Backoff controller: attempt accounting and the cancellable wait.
//!
//! Semantics:
//! - Options are resolved once, in the constructor, into a [`BackoffConfig`].
//! - [`Backoff::wait_once`] checks the attempt ceiling *before* counting the attempt, so with a
//!   limit of `N` the call at index `N` (0-based) is the first to fail.
//! - Each successful check arms exactly one timer, runs the wait strategy, and disarms the timer
//!   on every exit path (including when the `wait_once` future itself is dropped).
//!
//! Invariants:
//! - `attempt_count` equals the number of delays handed to the timer.
//! - Once exhausted or cancelled, the controller stays there and keeps returning the same error
//!   without arming another timer.
//!
//! Example
//! ```rust
//! use std::time::Duration;
//! use rebound::{Backoff, BackoffOptions};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let mut backoff = Backoff::new(
//!     BackoffOptions::new().min_delay(Duration::from_millis(1)).max_attempts(2),
//! );
//! assert!(backoff.wait_once().await.is_ok());
//! assert!(backoff.wait_once().await.is_ok());
//! let err = backoff.wait_once().await.unwrap_err();
//! assert!(err.is_too_many_attempts());
//! assert_eq!(backoff.attempt_count(), 2);
//! # });
//! ```

use crate::config::{BackoffConfig, BackoffOptions, Defaults};
use crate::delay::{DelayEngine, Seed};
use crate::error::{BackoffError, CancelReason};
use crate::jitter::Jitter;
use crate::sleeper::Sleeper;
use crate::timer::Timer;
use std::sync::Arc;
use std::time::Duration;

/// Where a controller is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffState {
    /// Ready for the next wait.
    Fresh,
    /// A timer is armed and the wait strategy is running. Only held while a `wait_once` future
    /// is alive; dropping that future returns the controller to `Fresh`.
    Waiting,
    /// The attempt ceiling was reached. Terminal.
    Exhausted,
    /// A wait was cancelled. Terminal.
    Cancelled(CancelReason),
}

impl BackoffState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Exhausted | Self::Cancelled(_))
    }
}

/// Exponential backoff with jitter for one retry session.
#[derive(Debug)]
pub struct Backoff {
    config: BackoffConfig,
    engine: DelayEngine,
    timer: Timer,
    attempt_count: usize,
    state: BackoffState,
}

impl Backoff {
    /// Resolve `options` against [`Defaults::STANDARD`].
    pub fn new(options: BackoffOptions) -> Self {
        Self::with_defaults(options, &Defaults::STANDARD)
    }

    /// Resolve `options` against custom defaults.
    pub fn with_defaults(options: BackoffOptions, defaults: &Defaults) -> Self {
        Self::from_config(options.resolve_with(defaults))
    }

    /// Use an already resolved configuration.
    pub fn from_config(config: BackoffConfig) -> Self {
        Self {
            config,
            engine: DelayEngine::default(),
            timer: Timer::default(),
            attempt_count: 0,
            state: BackoffState::Fresh,
        }
    }

    /// Replace the jitter seed. Meant to be called before the first wait.
    pub fn with_seed(mut self, seed: Seed) -> Self {
        self.engine = DelayEngine::new(seed);
        self
    }

    /// Provide a custom sleeper implementation.
    pub fn with_sleeper<S>(mut self, sleeper: S) -> Self
    where
        S: Sleeper + 'static,
    {
        self.timer = Timer::new(Arc::new(sleeper));
        self
    }

    pub fn config(&self) -> &BackoffConfig {
        &self.config
    }

    /// Number of waits started so far.
    pub fn attempt_count(&self) -> usize {
        self.attempt_count
    }

    pub fn state(&self) -> BackoffState {
        self.state
    }

    /// The raw (pre-jitter) delay of the latest wait.
    pub fn current_delay(&self) -> Option<Duration> {
        self.engine.current()
    }

    /// Start over with the same configuration: attempts, delay, and state are cleared.
    pub fn reset(&mut self) {
        self.attempt_count = 0;
        self.state = BackoffState::Fresh;
        self.engine.reset();
    }

    /// Wait for one backoff period.
    pub async fn wait_once(&mut self) -> Result<(), BackoffError> {
        match self.state {
            BackoffState::Exhausted => return Err(self.exhausted()),
            BackoffState::Cancelled(reason) => return Err(BackoffError::Cancelled(reason)),
            BackoffState::Fresh | BackoffState::Waiting => {}
        }

        if self.config.max_attempts().is_reached(self.attempt_count) {
            tracing::debug!(attempts = self.attempt_count, "backoff attempt limit reached");
            self.state = BackoffState::Exhausted;
            return Err(self.exhausted());
        }
        self.attempt_count += 1;

        let delay = self.engine.next(
            self.config.min_delay(),
            self.config.max_delay(),
            self.config.delay_factor(),
            Jitter::symmetric(self.config.max_jitter()),
        );
        tracing::debug!(attempt = self.attempt_count, ?delay, "backoff timer armed");

        let strategy = self.config.on_wait().clone();
        let mut fired = self.timer.arm(delay);
        let waiting = WaitingGuard::enter(&mut self.state);
        let outcome = strategy.wait(&mut fired).await;
        fired.stop();

        match outcome {
            Ok(()) => {
                waiting.leave(BackoffState::Fresh);
                Ok(())
            }
            Err(reason) => {
                waiting.leave(BackoffState::Cancelled(reason));
                Err(BackoffError::Cancelled(reason))
            }
        }
    }

    fn exhausted(&self) -> BackoffError {
        let max_attempts = self.config.max_attempts().get().unwrap_or(self.attempt_count);
        BackoffError::TooManyAttempts { max_attempts }
    }
}

/// Holds the state at `Waiting` for the duration of one wait; back to `Fresh` if dropped early.
struct WaitingGuard<'a> {
    state: &'a mut BackoffState,
}

impl<'a> WaitingGuard<'a> {
    fn enter(state: &'a mut BackoffState) -> Self {
        *state = BackoffState::Waiting;
        Self { state }
    }

    fn leave(self, next: BackoffState) {
        *self.state = next;
    }
}

impl Drop for WaitingGuard<'_> {
    fn drop(&mut self) {
        if *self.state == BackoffState::Waiting {
            *self.state = BackoffState::Fresh;
        }
    }
}
