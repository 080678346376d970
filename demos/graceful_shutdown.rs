//! Graceful Shutdown Example
//!
//! Demonstrates cancelling an in-flight retry sequence with a
//! `CancellationToken`. A background task simulates a shutdown signal
//! arriving while the retry loop is waiting out a backoff delay.

use std::time::Duration;

use resurge::{CancellationToken, Retry, RetryPolicy};

#[tokio::main]
async fn main() {
    println!("======================================");
    println!("      Graceful Shutdown Example       ");
    println!("======================================\n");

    let token = CancellationToken::new();

    // Simulated shutdown signal (Ctrl-C handler, SIGTERM, etc.)
    let shutdown = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        println!("  [shutdown] signal received, cancelling retries");
        shutdown.cancel();
    });

    // An upstream that never comes back; without cancellation this
    // would keep retrying for the full budget.
    let result = Retry::new(
        RetryPolicy::default()
            .with_max_retries(10)
            .with_base_delay(Duration::from_millis(200)),
    )
    .with_cancellation(token)
    .on_retry(|event| {
        println!(
            "  retry {} in {:?} after: {}",
            event.attempt, event.delay, event.error
        );
    })
    .run(|| async {
        println!("  dialing upstream...");
        Err::<(), _>("connection refused")
    })
    .await;

    match result {
        Ok(()) => println!("\nConnected (unexpected in this demo)"),
        Err(err) if err.is_cancelled() => {
            println!("\nStopped cleanly: {}", err);
            println!("Attempts before shutdown: {}", err.attempts());
        }
        Err(err) => println!("\nFailed: {}", err),
    }
}
