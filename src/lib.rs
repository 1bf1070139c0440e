#![forbid(unsafe_code)]
#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::all))]

//! # Rebound
//!
//! Exponential backoff with jitter, and a retry driver that can be cancelled while it waits.
//!
//! ## Features
//!
//! - **Bounded geometric delays**: `min`, `min * f`, `min * f²`, … capped at `max`
//! - **Symmetric jitter** of up to `±max_jitter` of each delay, reproducible with a fixed seed
//! - **Attempt ceilings**, or unlimited attempts
//! - **Cancellation** via `CancellationToken` or deadline, raced against every pending wait
//! - **Injectable time** through the `Sleeper` abstraction
//!
//! ## Quick Start
//!
//! ```rust
//! use rebound::{retry_do, Attempt, BackoffOptions, Cancellation};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let options = BackoffOptions::new()
//!         .min_delay(Duration::from_millis(10))
//!         .max_delay(Duration::from_secs(1))
//!         .max_attempts(3);
//!     let cancellation = Cancellation::none().with_timeout(Duration::from_secs(5));
//!
//!     let done = retry_do(
//!         || async {
//!             // Your operation here
//!             Attempt::<std::io::Error>::Succeeded
//!         },
//!         cancellation,
//!         options,
//!     )
//!     .await;
//!     assert_eq!(done.ok(), Some(true));
//! }
//! ```
//!
//! Defaults: 100ms floor, 100s ceiling, factor 2, ±100% jitter, 100 attempts.

pub mod backoff;
pub mod config;
pub mod delay;
pub mod error;
pub mod jitter;
pub mod prelude;
pub mod retry;
pub mod sleeper;
pub mod timer;
pub mod wait;

// Re-exports
pub use backoff::{Backoff, BackoffState};
pub use config::{AttemptLimit, BackoffConfig, BackoffOptions, Defaults};
pub use delay::{DelayEngine, Seed};
pub use error::{BackoffError, CancelReason, RetryError};
pub use jitter::Jitter;
pub use retry::{retry_do, Attempt};
pub use sleeper::{InstantSleeper, Sleeper, TokioSleeper, TrackingSleeper};
pub use timer::{Fired, Timer};
pub use wait::{Cancellation, UntilFired, WaitStrategy};
pub use tokio_util::sync::CancellationToken;
