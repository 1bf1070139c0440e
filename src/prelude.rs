//! Convenient re-exports for common Rebound types.
pub use crate::{
    backoff::{Backoff, BackoffState},
    config::{AttemptLimit, BackoffOptions, Defaults},
    error::{BackoffError, CancelReason, RetryError},
    retry::{retry_do, Attempt},
    wait::{Cancellation, WaitStrategy},
    CancellationToken,
};
