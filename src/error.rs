//! Error types for backoff and retry
//!
//! Three outcomes reach callers, and none of them are retried internally:
//! - [`BackoffError::TooManyAttempts`]: the attempt ceiling was reached.
//! - [`BackoffError::Cancelled`] / [`RetryError::Cancelled`]: an external cancellation won the
//!   race against a pending wait. The [`CancelReason`] is passed through as-is.
//! - [`RetryError::Operation`]: the retried operation failed hard; its error is passed through.

/// Why a pending wait was abandoned.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CancelReason {
    /// The cancellation token was triggered.
    #[error("operation cancelled")]
    Cancelled,
    /// The deadline passed before the wait completed.
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

/// Errors returned by [`Backoff::wait_once`](crate::Backoff::wait_once).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BackoffError {
    /// The configured number of backoff attempts has been used up.
    #[error("backoff: too many attempts; max_attempts={max_attempts}")]
    TooManyAttempts {
        /// The configured ceiling.
        max_attempts: usize,
    },
    /// The wait strategy abandoned the wait.
    #[error(transparent)]
    Cancelled(#[from] CancelReason),
}

impl BackoffError {
    /// Check if this error is due to attempt exhaustion
    pub fn is_too_many_attempts(&self) -> bool {
        matches!(self, Self::TooManyAttempts { .. })
    }

    /// Check if this error is due to cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// The cancellation reason, if any.
    pub fn cancel_reason(&self) -> Option<CancelReason> {
        match self {
            Self::Cancelled(reason) => Some(*reason),
            _ => None,
        }
    }

    /// The configured attempt ceiling, if this is an exhaustion error.
    pub fn max_attempts(&self) -> Option<usize> {
        match self {
            Self::TooManyAttempts { max_attempts } => Some(*max_attempts),
            _ => None,
        }
    }
}

/// Errors returned by [`retry_do`](crate::retry_do) and [`Backoff::run`](crate::Backoff::run).
///
/// Running out of attempts is not an error for the driver; it reports `Ok(false)` instead.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// The operation reported a hard failure.
    #[error("{0}")]
    Operation(E),
    /// A backoff wait between attempts was cancelled.
    #[error(transparent)]
    Cancelled(CancelReason),
}

impl<E> RetryError<E> {
    /// Check if this error is due to cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// Check if this error wraps an operation failure.
    pub fn is_operation(&self) -> bool {
        matches!(self, Self::Operation(_))
    }

    /// Get the operation error if this is an `Operation` variant
    pub fn into_operation(self) -> Option<E> {
        match self {
            Self::Operation(e) => Some(e),
            _ => None,
        }
    }

    /// Borrow the operation error if present.
    pub fn as_operation(&self) -> Option<&E> {
        match self {
            Self::Operation(e) => Some(e),
            _ => None,
        }
    }

    /// The cancellation reason, if any.
    pub fn cancel_reason(&self) -> Option<CancelReason> {
        match self {
            Self::Cancelled(reason) => Some(*reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::fmt;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct DummyError(&'static str);

    impl fmt::Display for DummyError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl std::error::Error for DummyError {}

    #[test]
    fn too_many_attempts_display_includes_limit() {
        let err = BackoffError::TooManyAttempts { max_attempts: 7 };
        let msg = err.to_string();
        assert!(msg.contains("too many attempts"));
        assert!(msg.contains("max_attempts=7"));
        assert_eq!(err.max_attempts(), Some(7));
        assert!(err.cancel_reason().is_none());
    }

    #[test]
    fn cancelled_is_transparent() {
        let err = BackoffError::from(CancelReason::DeadlineExceeded);
        assert_eq!(err.to_string(), CancelReason::DeadlineExceeded.to_string());
        assert!(err.is_cancelled());
        assert!(!err.is_too_many_attempts());
        assert_eq!(err.cancel_reason(), Some(CancelReason::DeadlineExceeded));
    }

    #[test]
    fn operation_error_passes_through() {
        let err: RetryError<DummyError> = RetryError::Operation(DummyError("my error"));
        assert_eq!(err.to_string(), "my error");
        assert!(err.is_operation());
        assert!(!err.is_cancelled());
        assert_eq!(err.as_operation(), Some(&DummyError("my error")));
        assert_eq!(err.into_operation(), Some(DummyError("my error")));
    }

    #[test]
    fn retry_cancelled_keeps_reason_identity() {
        let err: RetryError<DummyError> = RetryError::Cancelled(CancelReason::Cancelled);
        assert_eq!(err.cancel_reason(), Some(CancelReason::Cancelled));
        assert!(err.source().is_none());
        assert!(err.into_operation().is_none());
    }
}
