//! Retry Patterns Example
//!
//! Demonstrates bounded retry patterns for async operations.
//! Shows practical patterns including:
//! - Basic retry with capped exponential backoff
//! - Inspecting a policy's delay schedule
//! - Conditional retry (retry_if)
//! - Retry with observability hooks
//! - Handling an exhausted retry budget

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use resurge::{execute_with, Retry, RetryPolicy};

// ==================== Basic Retry ====================

/// Example 1: Basic retry with exponential backoff
///
/// Demonstrates retrying an operation that fails transiently.
async fn example_basic_retry() {
    println!("\n=== Example 1: Basic Retry ===");

    // Track the number of attempts
    let attempts = Arc::new(AtomicU32::new(0));

    let result = execute_with(
        || {
            let attempts = attempts.clone();
            async move {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                println!("  Attempt {}", n + 1);
                if n < 2 {
                    Err("transient failure")
                } else {
                    Ok("success!")
                }
            }
        },
        RetryPolicy::default()
            .with_max_retries(5)
            .with_base_delay(Duration::from_millis(50)),
    )
    .await;

    match result {
        Ok(value) => println!("Success: {}", value),
        Err(err) => println!("Failed: {}", err),
    }
    println!("Total attempts: {}", attempts.load(Ordering::SeqCst));
}

// ==================== Delay Schedules ====================

/// Example 2: Inspecting delay schedules
///
/// Shows how delays double per attempt until the cap takes over.
async fn example_delay_schedule() {
    println!("\n=== Example 2: Delay Schedules ===");

    let default_policy = RetryPolicy::default().with_max_retries(5);
    println!("Default policy (1s base, 10s cap):");
    for i in 0..5 {
        if let Some(d) = default_policy.delay_for_attempt(i) {
            println!("  Delay before retry {}: {:?}", i + 1, d);
        }
    }

    let capped = RetryPolicy::default()
        .with_max_retries(8)
        .with_base_delay(Duration::from_millis(100))
        .with_max_delay(Duration::from_millis(500));
    println!("\nTight cap (100ms base, 500ms cap):");
    for i in 0..8 {
        if let Some(d) = capped.delay_for_attempt(i) {
            println!("  Delay before retry {}: {:?}", i + 1, d);
        }
    }
}

// ==================== Conditional Retry ====================

/// Example 3: Retry only on specific errors
///
/// Demonstrates retry_if to distinguish transient from permanent errors,
/// using a simulated HTTP client.
async fn example_conditional_retry() {
    println!("\n=== Example 3: Conditional Retry ===");

    #[derive(Debug, Clone)]
    enum HttpError {
        Timeout,
        ServerError(u16),
        ClientError(u16),
    }

    impl std::fmt::Display for HttpError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                HttpError::Timeout => write!(f, "request timed out"),
                HttpError::ServerError(code) => write!(f, "server error: {}", code),
                HttpError::ClientError(code) => write!(f, "client error: {}", code),
            }
        }
    }

    // Only retry on timeouts and server errors, not client errors
    fn is_retryable(err: &HttpError) -> bool {
        matches!(err, HttpError::Timeout | HttpError::ServerError(_))
    }

    let attempts = Arc::new(AtomicU32::new(0));

    // Simulate an API that fails twice with retryable errors then succeeds
    let result = Retry::new(
        RetryPolicy::default()
            .with_max_retries(5)
            .with_base_delay(Duration::from_millis(50)),
    )
    .retry_if(is_retryable)
    .run(|| {
        let attempts = attempts.clone();
        async move {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            println!("  HTTP request attempt {}", n + 1);
            match n {
                0 => Err(HttpError::ServerError(503)), // Service Unavailable
                1 => Err(HttpError::Timeout),
                _ => Ok("{ \"status\": \"ok\" }"),
            }
        }
    })
    .await;

    match result {
        Ok(body) => println!("Response: {}", body),
        Err(e) => println!("Request failed: {}", e),
    }

    // Client errors (4xx) are NOT retried
    println!("\n--- Client Error (should NOT retry) ---");
    let attempts = Arc::new(AtomicU32::new(0));

    let result = Retry::new(
        RetryPolicy::default()
            .with_max_retries(5)
            .with_base_delay(Duration::from_millis(50)),
    )
    .retry_if(is_retryable)
    .run(|| {
        let attempts = attempts.clone();
        async move {
            attempts.fetch_add(1, Ordering::SeqCst);
            println!("  HTTP request attempt");
            // Bad request, retrying will never help
            Err::<&str, _>(HttpError::ClientError(400))
        }
    })
    .await;

    match result {
        Ok(body) => println!("Response: {}", body),
        Err(e) => println!("Request failed (no retries for client error): {}", e),
    }
    println!("Total attempts: {}", attempts.load(Ordering::SeqCst));
}

// ==================== Retry with Observability ====================

/// Example 4: Retry with a hook for logging/metrics
///
/// Demonstrates on_retry for observability. The hook fires once per
/// scheduled retry, before the delay is slept.
async fn example_retry_with_hook() {
    println!("\n=== Example 4: Retry with Hook ===");

    let attempts = Arc::new(AtomicU32::new(0));

    let result = Retry::new(
        RetryPolicy::default()
            .with_max_retries(5)
            .with_base_delay(Duration::from_millis(50)),
    )
    .on_retry(|event| {
        println!(
            "  [HOOK] retry {} scheduled in {:?} after: {} (elapsed {:?})",
            event.attempt, event.delay, event.error, event.elapsed
        );
    })
    .run(|| {
        let attempts = attempts.clone();
        async move {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            if n < 3 {
                Err(format!("error on attempt {}", n + 1))
            } else {
                Ok("finally succeeded!")
            }
        }
    })
    .await;

    match result {
        Ok(value) => println!("Success: {}", value),
        Err(err) => println!("Failed: {}", err),
    }
}

// ==================== Exhaustion ====================

/// Example 5: Running out of retries
///
/// Demonstrates the error returned once the retry budget is spent.
async fn example_exhaustion() {
    println!("\n=== Example 5: Exhaustion ===");

    let attempts = Arc::new(AtomicU32::new(0));

    let result = execute_with(
        || {
            let attempts = attempts.clone();
            async move {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                println!("  Attempt {}", n + 1);
                Err::<&str, String>(format!("still down (attempt {})", n + 1))
            }
        },
        RetryPolicy::default()
            .with_max_retries(2)
            .with_base_delay(Duration::from_millis(50)),
    )
    .await;

    let err = result.unwrap_err();
    println!("Final error: {}", err);
    println!("Attempts made: {}", err.attempts());
    if let Some(last) = err.last_error() {
        println!("Last underlying error: {}", last);
    }
}

#[tokio::main]
async fn main() {
    println!("======================================");
    println!("       Retry Patterns Example         ");
    println!("======================================");

    example_basic_retry().await;
    example_delay_schedule().await;
    example_conditional_retry().await;
    example_retry_with_hook().await;
    example_exhaustion().await;

    println!("\n======================================");
    println!("           Examples Complete           ");
    println!("======================================");
}
