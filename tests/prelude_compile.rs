//! Compile-time prelude coverage test.
use rebound::prelude::*;
use std::time::Duration;

#[tokio::test]
async fn prelude_reexports_core_types() {
    let options = BackoffOptions::new()
        .min_delay(Duration::from_millis(1))
        .max_jitter(0.0)
        .max_attempts(1)
        .on_wait(Cancellation::new(CancellationToken::new()));
    let mut backoff = Backoff::with_defaults(options.clone(), &Defaults::STANDARD);
    assert_eq!(backoff.config().max_attempts(), AttemptLimit::Limited(1));

    backoff.wait_once().await.expect("first wait is within the limit");
    let err: BackoffError = backoff.wait_once().await.unwrap_err();
    assert!(err.is_too_many_attempts());
    assert_eq!(backoff.state(), BackoffState::Exhausted);

    let result: Result<bool, RetryError<std::io::Error>> =
        retry_do(|| async { Attempt::Succeeded }, Cancellation::none(), options).await;
    assert!(matches!(result, Ok(true)));
    let _reason = CancelReason::Cancelled;
    fn assert_strategy<W: WaitStrategy>(_: &W) {}
    assert_strategy(&Cancellation::none());
}
