//! Cancellation token behavior across the three checkpoints: before an
//! attempt, while an attempt is in flight, and during a delay.

#![cfg(feature = "async")]

use resurge::testing::AttemptLog;
use resurge::{
    assert_cancelled, assert_exhausted, CancellationToken, Retry, RetryError, RetryPolicy,
};
use std::time::Duration;
use tokio::time::{sleep, Instant};

#[tokio::test(start_paused = true)]
async fn test_cancel_during_delay_stops_promptly() {
    let token = CancellationToken::new();
    let log = AttemptLog::new();
    let started = Instant::now();

    let canceller = token.clone();
    tokio::spawn(async move {
        sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    // First attempt fails instantly, then a 5s delay would follow.
    let policy = RetryPolicy::default().with_base_delay(Duration::from_secs(5));
    let result: Result<(), _> = Retry::new(policy)
        .with_cancellation(token)
        .run(|| {
            let log = log.clone();
            async move {
                log.begin();
                Err("down")
            }
        })
        .await;

    assert_cancelled!(result, attempts = 1);
    assert_eq!(log.attempts(), 1);
    assert_eq!(started.elapsed(), Duration::from_millis(100)); // not the full delay
}

#[tokio::test(start_paused = true)]
async fn test_cancel_interrupts_inflight_operation() {
    let token = CancellationToken::new();
    let started = Instant::now();

    let canceller = token.clone();
    tokio::spawn(async move {
        sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let result: Result<(), RetryError<String>> = Retry::new(RetryPolicy::default())
        .with_cancellation(token)
        .run(|| async {
            sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await;

    assert_cancelled!(result, attempts = 0); // the first attempt never finished
    assert_eq!(started.elapsed(), Duration::from_millis(50));
}

#[tokio::test]
async fn test_pre_cancelled_token_prevents_any_attempt() {
    let token = CancellationToken::new();
    token.cancel();
    let log = AttemptLog::new();

    let result: Result<(), RetryError<&str>> = Retry::new(RetryPolicy::default())
        .with_cancellation(token)
        .run(|| {
            let log = log.clone();
            async move {
                log.begin();
                Err("never reached")
            }
        })
        .await;

    assert_cancelled!(result, attempts = 0);
    assert_eq!(log.attempts(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_unfired_token_leaves_behavior_unchanged() {
    let token = CancellationToken::new();
    let log = AttemptLog::new();

    let result: Result<(), _> = Retry::new(RetryPolicy::default())
        .with_cancellation(token.clone())
        .run(|| {
            let log = log.clone();
            async move {
                log.begin();
                Err("down")
            }
        })
        .await;

    let last = assert_exhausted!(result, attempts = 4);
    assert_eq!(last, "down");
    assert_eq!(log.attempts(), 4);
    assert!(!token.is_cancelled());
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_error_is_distinct() {
    let token = CancellationToken::new();
    token.cancel();

    let result: Result<(), RetryError<String>> = Retry::new(RetryPolicy::default())
        .with_cancellation(token)
        .run(|| async { Err("unreachable".to_string()) })
        .await;

    let err = result.unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(err.last_error(), None);
    assert!(err.to_string().contains("cancelled"));
}
