//! Retry driver
//!
//! Repeatedly invokes an operation that reports one of three outcomes and backs off between
//! attempts.
//!
//! Semantics:
//! - `max_attempts` counts operation invocations. The operation always runs at least once.
//! - [`Attempt::Failed`] ends the loop at once with [`RetryError::Operation`]; no backoff is
//!   consumed.
//! - [`Attempt::Succeeded`] returns `Ok(true)`.
//! - [`Attempt::Retry`] on the final permitted invocation returns `Ok(false)`; otherwise the
//!   driver waits one backoff step. A cancelled wait returns [`RetryError::Cancelled`].
//! - Cancellation is only observed between attempts: the operation future is awaited to
//!   completion.
//!
//! Example
//! ```rust
//! use std::time::Duration;
//! use rebound::{retry_do, Attempt, BackoffOptions, Cancellation};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let mut calls = 0;
//! let result = retry_do(
//!     || {
//!         calls += 1;
//!         let n = calls;
//!         async move { if n < 3 { Attempt::<std::io::Error>::Retry } else { Attempt::Succeeded } }
//!     },
//!     Cancellation::none(),
//!     BackoffOptions::new().min_delay(Duration::from_millis(1)).max_attempts(5),
//! )
//! .await;
//! assert_eq!(result.unwrap(), true);
//! assert_eq!(calls, 3);
//! # });
//! ```

use crate::backoff::Backoff;
use crate::config::BackoffOptions;
use crate::error::{BackoffError, RetryError};
use crate::wait::Cancellation;
use std::future::Future;

/// Outcome of a single operation invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<E> {
    /// Done; stop retrying.
    Succeeded,
    /// Failed in a way worth retrying.
    Retry,
    /// Failed permanently.
    Failed(E),
}

impl<E> From<Result<bool, E>> for Attempt<E> {
    /// `Ok(true)` succeeded, `Ok(false)` retry, `Err(e)` hard failure.
    fn from(result: Result<bool, E>) -> Self {
        match result {
            Ok(true) => Attempt::Succeeded,
            Ok(false) => Attempt::Retry,
            Err(e) => Attempt::Failed(e),
        }
    }
}

/// Run `operation` until it succeeds, fails hard, runs out of attempts, or `cancellation` cuts
/// a backoff wait short.
///
/// `cancellation` becomes the wait strategy, replacing any `on_wait` set in `options`.
pub async fn retry_do<E, Fut, Op>(
    operation: Op,
    cancellation: Cancellation,
    options: BackoffOptions,
) -> Result<bool, RetryError<E>>
where
    Fut: Future<Output = Attempt<E>>,
    Op: FnMut() -> Fut,
{
    Backoff::new(options.on_wait(cancellation)).run(operation).await
}

impl Backoff {
    /// Drive `operation` with this controller's configuration, sharing its delay sequence.
    pub async fn run<E, Fut, Op>(&mut self, mut operation: Op) -> Result<bool, RetryError<E>>
    where
        Fut: Future<Output = Attempt<E>>,
        Op: FnMut() -> Fut,
    {
        let limit = self.config().max_attempts();
        let mut invocations = 0usize;
        loop {
            invocations += 1;
            match operation().await {
                Attempt::Succeeded => return Ok(true),
                Attempt::Failed(e) => return Err(RetryError::Operation(e)),
                Attempt::Retry => {}
            }

            if limit.is_reached(invocations) {
                tracing::debug!(invocations, "retry attempts exhausted");
                return Ok(false);
            }

            match self.wait_once().await {
                Ok(()) => {}
                Err(BackoffError::TooManyAttempts { .. }) => return Ok(false),
                Err(BackoffError::Cancelled(reason)) => return Err(RetryError::Cancelled(reason)),
            }
        }
    }
}
