//! One-shot backoff timer.
//!
//! [`Timer::arm`] returns a [`Fired`] future that completes once the delay elapses. The timer
//! is stopped either explicitly with [`Fired::stop`] or by dropping the `Fired`; in both cases
//! the sleeper future is dropped, so no wake-up is left pending.

use crate::sleeper::{Sleeper, TokioSleeper};
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

/// Arms one-shot timers on top of a [`Sleeper`].
#[derive(Debug, Clone)]
pub struct Timer {
    sleeper: Arc<dyn Sleeper>,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new(Arc::new(TokioSleeper))
    }
}

impl Timer {
    pub fn new(sleeper: Arc<dyn Sleeper>) -> Self {
        Self { sleeper }
    }

    /// Start a timer for `delay`.
    pub fn arm(&self, delay: Duration) -> Fired {
        Fired { sleep: Some(self.sleeper.sleep(delay)), delay }
    }
}

/// Completion signal of an armed timer.
///
/// Resolves once; polling again after completion returns `Ready` immediately.
pub struct Fired {
    sleep: Option<BoxFuture<'static, ()>>,
    delay: Duration,
}

impl fmt::Debug for Fired {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fired")
            .field("delay", &self.delay)
            .field("fired", &self.is_fired())
            .finish()
    }
}

impl Fired {
    /// The delay this timer was armed with.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_fired(&self) -> bool {
        self.sleep.is_none()
    }

    /// Disarm the timer. Returns `true` if it had not fired yet.
    pub fn stop(mut self) -> bool {
        self.disarm()
    }

    fn disarm(&mut self) -> bool {
        match self.sleep.take() {
            Some(_) => {
                tracing::trace!(delay = ?self.delay, "backoff timer disarmed before firing");
                true
            }
            None => false,
        }
    }
}

impl Future for Fired {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let Some(sleep) = self.sleep.as_mut() else {
            return Poll::Ready(());
        };
        match sleep.as_mut().poll(cx) {
            Poll::Ready(()) => {
                self.sleep = None;
                Poll::Ready(())
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for Fired {
    fn drop(&mut self) {
        self.disarm();
    }
}
