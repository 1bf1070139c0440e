//! Abstraction for sleeping/waiting
//!
//! The backoff timer never calls `tokio::time::sleep` directly; it asks a [`Sleeper`] for a
//! future that completes after the delay. Dropping that future must cancel the pending wake-up.
//! Tests swap in [`InstantSleeper`] or [`TrackingSleeper`] to run without real delays.

use futures::future::BoxFuture;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Abstraction for sleeping/waiting
pub trait Sleeper: Send + Sync + std::fmt::Debug {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

/// Production sleeper using tokio runtime
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Test sleeper that completes immediately
#[derive(Debug, Default, Clone, Copy)]
pub struct InstantSleeper;

impl Sleeper for InstantSleeper {
    fn sleep(&self, _duration: Duration) -> BoxFuture<'static, ()> {
        Box::pin(async {})
    }
}

/// Sleeper that records every requested delay, then delegates to an inner sleeper.
///
/// `TrackingSleeper::new()` wraps [`InstantSleeper`]; use [`TrackingSleeper::wrapping`] to
/// record delays while still sleeping for real.
#[derive(Debug, Clone)]
pub struct TrackingSleeper {
    calls: Arc<Mutex<Vec<Duration>>>,
    inner: Arc<dyn Sleeper>,
}

impl TrackingSleeper {
    pub fn new() -> Self {
        Self::wrapping(InstantSleeper)
    }

    pub fn wrapping<S: Sleeper + 'static>(inner: S) -> Self {
        Self { calls: Arc::new(Mutex::new(Vec::new())), inner: Arc::new(inner) }
    }

    /// Delays requested so far, oldest first.
    pub fn calls(&self) -> Vec<Duration> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    /// Sum of all requested delays.
    pub fn total(&self) -> Duration {
        self.calls().into_iter().sum()
    }

    pub fn clear(&self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.clear();
        }
    }
}

impl Default for TrackingSleeper {
    fn default() -> Self {
        Self::new()
    }
}

impl Sleeper for TrackingSleeper {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(duration);
        }
        self.inner.sleep(duration)
    }
}
