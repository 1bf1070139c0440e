#![allow(dead_code)]

use futures::future::BoxFuture;
use rebound::Sleeper;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Real tokio sleeper that counts timers armed, fired, and released.
///
/// A timer is released when its sleep future is dropped, whether it fired, was stopped, or was
/// never polled at all.
#[derive(Debug, Clone, Default)]
pub struct CountingSleeper {
    armed: Arc<AtomicUsize>,
    fired: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
}

impl CountingSleeper {
    pub fn armed(&self) -> usize {
        self.armed.load(Ordering::SeqCst)
    }

    pub fn fired(&self) -> usize {
        self.fired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    /// Armed timers whose sleep future is still alive.
    pub fn outstanding(&self) -> usize {
        self.armed() - self.released()
    }
}

struct ReleaseOnDrop(Arc<AtomicUsize>);

impl Drop for ReleaseOnDrop {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

impl Sleeper for CountingSleeper {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        self.armed.fetch_add(1, Ordering::SeqCst);
        let fired = self.fired.clone();
        // moved into the future now, so it is released even if never polled
        let release = ReleaseOnDrop(self.released.clone());
        Box::pin(async move {
            let _release = release;
            tokio::time::sleep(duration).await;
            fired.fetch_add(1, Ordering::SeqCst);
        })
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}
