//! Wait strategies: what a backoff step does while its timer is armed.
//!
//! - [`UntilFired`] (default): wait for the timer, never fail.
//! - [`Cancellation`]: race the timer against a [`CancellationToken`] and/or a deadline.
//!   Cancellation is polled first, so a signal that is already asserted always wins, even if the
//!   timer has fired too.
//!
//! ```rust
//! use std::time::Duration;
//! use rebound::{Backoff, BackoffOptions, CancelReason, Cancellation};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let cancellation = Cancellation::none().with_timeout(Duration::from_millis(10));
//! let mut backoff = Backoff::new(
//!     BackoffOptions::new()
//!         .min_delay(Duration::from_secs(60))
//!         .max_jitter(0.0)
//!         .on_wait(cancellation),
//! );
//! let err = backoff.wait_once().await.unwrap_err();
//! assert_eq!(err.cancel_reason(), Some(CancelReason::DeadlineExceeded));
//! # });
//! ```

use crate::error::CancelReason;
use crate::timer::Fired;
use async_trait::async_trait;
use std::fmt;
use std::future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Pluggable behavior for a single backoff wait.
#[async_trait]
pub trait WaitStrategy: Send + Sync + fmt::Debug {
    /// Block until `fired` completes or the wait is abandoned.
    async fn wait(&self, fired: &mut Fired) -> Result<(), CancelReason>;
}

/// Wait for the timer to fire. Never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct UntilFired;

#[async_trait]
impl WaitStrategy for UntilFired {
    async fn wait(&self, fired: &mut Fired) -> Result<(), CancelReason> {
        fired.await;
        Ok(())
    }
}

/// Externally owned cancellation signal: a token, a deadline, both, or neither.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    token: Option<CancellationToken>,
    deadline: Option<Instant>,
}

impl Cancellation {
    /// Never cancels.
    pub fn none() -> Self {
        Self::default()
    }

    /// Cancelled when `token` is.
    pub fn new(token: CancellationToken) -> Self {
        Self { token: Some(token), deadline: None }
    }

    /// Cancelled once `deadline` passes.
    pub fn deadline(deadline: Instant) -> Self {
        Self { token: None, deadline: Some(deadline) }
    }

    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Keeps the earlier deadline if one is already set.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(self.deadline.map_or(deadline, |current| current.min(deadline)));
        self
    }

    /// Deadline `timeout` from now. A timeout past the clock's range sets no deadline.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self,
        }
    }

    pub fn token(&self) -> Option<&CancellationToken> {
        self.token.as_ref()
    }

    pub fn deadline_at(&self) -> Option<Instant> {
        self.deadline
    }

    /// The reason this signal is asserted right now, if it is.
    pub fn reason(&self) -> Option<CancelReason> {
        if self.token.as_ref().is_some_and(CancellationToken::is_cancelled) {
            Some(CancelReason::Cancelled)
        } else if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            Some(CancelReason::DeadlineExceeded)
        } else {
            None
        }
    }

    async fn cancelled(&self) {
        match &self.token {
            Some(token) => token.cancelled().await,
            None => future::pending().await,
        }
    }

    async fn expired(&self) {
        match self.deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => future::pending().await,
        }
    }
}

#[async_trait]
impl WaitStrategy for Cancellation {
    async fn wait(&self, fired: &mut Fired) -> Result<(), CancelReason> {
        let outcome = tokio::select! {
            biased;
            () = self.cancelled() => Err(CancelReason::Cancelled),
            () = self.expired() => Err(CancelReason::DeadlineExceeded),
            () = &mut *fired => Ok(()),
        };
        if let Err(reason) = outcome {
            tracing::debug!(%reason, delay = ?fired.delay(), "backoff wait cancelled");
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sleeper::InstantSleeper;
    use crate::timer::Timer;
    use std::sync::Arc;

    fn instant_timer() -> Timer {
        Timer::new(Arc::new(InstantSleeper))
    }

    #[tokio::test]
    async fn until_fired_waits_for_timer() {
        let mut fired = instant_timer().arm(Duration::from_secs(1));
        assert_eq!(UntilFired.wait(&mut fired).await, Ok(()));
        assert!(fired.is_fired());
    }

    #[tokio::test]
    async fn no_signal_behaves_like_until_fired() {
        let mut fired = instant_timer().arm(Duration::from_secs(1));
        assert_eq!(Cancellation::none().wait(&mut fired).await, Ok(()));
        assert!(Cancellation::none().reason().is_none());
    }

    #[tokio::test]
    async fn asserted_token_wins_over_fired_timer() {
        let token = CancellationToken::new();
        token.cancel();
        let mut fired = instant_timer().arm(Duration::ZERO);
        let result = Cancellation::new(token).wait(&mut fired).await;
        assert_eq!(result, Err(CancelReason::Cancelled));
        assert!(!fired.is_fired());
    }

    #[tokio::test(start_paused = true)]
    async fn passed_deadline_reports_deadline_exceeded() {
        let cancellation = Cancellation::deadline(Instant::now());
        assert_eq!(cancellation.reason(), Some(CancelReason::DeadlineExceeded));
        let mut fired = instant_timer().arm(Duration::ZERO);
        assert_eq!(cancellation.wait(&mut fired).await, Err(CancelReason::DeadlineExceeded));
    }

    #[tokio::test(start_paused = true)]
    async fn token_takes_precedence_over_deadline() {
        let token = CancellationToken::new();
        token.cancel();
        let cancellation = Cancellation::new(token).with_deadline(Instant::now());
        assert_eq!(cancellation.reason(), Some(CancelReason::Cancelled));
        let mut fired = Timer::default().arm(Duration::from_secs(1));
        assert_eq!(cancellation.wait(&mut fired).await, Err(CancelReason::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn earlier_deadline_is_kept() {
        let now = Instant::now();
        let cancellation = Cancellation::deadline(now + Duration::from_secs(1))
            .with_deadline(now + Duration::from_secs(5));
        assert_eq!(cancellation.deadline_at(), Some(now + Duration::from_secs(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn unbounded_timeout_sets_no_deadline() {
        let cancellation = Cancellation::none().with_timeout(Duration::MAX);
        assert_eq!(cancellation.deadline_at(), None);
        assert!(cancellation.reason().is_none());

        let now = Instant::now();
        let bounded = Cancellation::deadline(now + Duration::from_secs(1))
            .with_timeout(Duration::MAX);
        assert_eq!(bounded.deadline_at(), Some(now + Duration::from_secs(1)));

        let mut fired = instant_timer().arm(Duration::from_secs(1));
        assert_eq!(cancellation.wait(&mut fired).await, Ok(()));
    }

    #[tokio::test(start_paused = true)]
    async fn timer_wins_before_deadline() {
        let cancellation = Cancellation::none().with_timeout(Duration::from_secs(10));
        let mut fired = Timer::default().arm(Duration::from_secs(1));
        let start = Instant::now();
        assert_eq!(cancellation.wait(&mut fired).await, Ok(()));
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(1) && elapsed < Duration::from_secs(2));
    }
}
