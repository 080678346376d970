//! The retry executor.
//!
//! [`execute`] and [`execute_with`] drive a fallible async operation through
//! repeated attempts with capped exponential delays between failures. The
//! [`Retry`] builder adds the optional collaborators: a retry predicate, an
//! `on_retry` hook, and a cancellation token.
//!
//! # Why a factory function?
//!
//! Futures are consumed when polled to completion, so "try again" means
//! building a new one. The operation is therefore an `FnMut() -> Future`
//! factory: each attempt calls it again from scratch, which is also the
//! semantically honest shape for I/O (fresh connection, new request id)
//! rather than pretending a spent future can be rewound.
//!
//! Attempts are strictly sequential. A new attempt starts only after the
//! previous one has finished and its delay has elapsed, and every call to
//! the executor owns its loop state, so concurrent executions never share
//! counters or delays.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use tokio::time::{sleep, Instant};

// Re-exported so callers don't need a direct tokio-util dependency to
// construct a token for [`Retry::with_cancellation`].
pub use tokio_util::sync::CancellationToken;

use crate::error::RetryError;
use crate::policy::{RetryEvent, RetryPolicy};

type Predicate<E> = Box<dyn Fn(&E) -> bool + Send + Sync>;
type Hook<E> = Box<dyn FnMut(&RetryEvent<'_, E>) + Send>;

/// Execute an operation with the default retry policy.
///
/// Up to 4 total attempts (1 initial + 3 retries) with delays of 1s, 2s,
/// and 4s between them. Success returns immediately; no delay or hook runs
/// after the final failure.
///
/// # Examples
///
/// ```rust
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let calls = Arc::new(AtomicU32::new(0));
///
/// let value = resurge::execute(|| {
///     let calls = calls.clone();
///     async move {
///         calls.fetch_add(1, Ordering::SeqCst);
///         Ok::<_, String>(42)
///     }
/// })
/// .await
/// .unwrap();
///
/// assert_eq!(value, 42);
/// assert_eq!(calls.load(Ordering::SeqCst), 1); // succeeded on the first try
/// # });
/// ```
pub async fn execute<T, E, F, Fut>(operation: F) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    execute_with(operation, RetryPolicy::default()).await
}

/// Execute an operation under an explicit [`RetryPolicy`].
///
/// # Examples
///
/// ```rust
/// use resurge::{execute_with, RetryPolicy};
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let calls = Arc::new(AtomicU32::new(0));
/// let policy = RetryPolicy::default()
///     .with_max_retries(5)
///     .with_base_delay(Duration::from_millis(1));
///
/// // Fails twice, then connects.
/// let value = execute_with(
///     || {
///         let calls = calls.clone();
///         async move {
///             if calls.fetch_add(1, Ordering::SeqCst) < 2 {
///                 Err("transient")
///             } else {
///                 Ok("connected")
///             }
///         }
///     },
///     policy,
/// )
/// .await
/// .unwrap();
///
/// assert_eq!(value, "connected");
/// assert_eq!(calls.load(Ordering::SeqCst), 3);
/// # });
/// ```
pub async fn execute_with<T, E, F, Fut>(
    operation: F,
    policy: RetryPolicy,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    Retry::new(policy).run(operation).await
}

/// A configured retry execution, built up method by method.
///
/// [`execute`] and [`execute_with`] cover the common cases; the builder is
/// for executions that also need a predicate, a hook, or cancellation:
///
/// ```rust
/// use resurge::{Retry, RetryPolicy};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let policy = RetryPolicy::default()
///     .with_max_retries(2)
///     .with_base_delay(Duration::from_millis(1));
///
/// let result: Result<(), _> = Retry::new(policy)
///     .retry_if(|err: &&str| *err != "fatal")
///     .on_retry(|event| println!("Retrying... attempt {}", event.attempt))
///     .run(|| async { Err("fatal") })
///     .await;
///
/// // "fatal" is rejected by the predicate: one attempt, no retries.
/// assert_eq!(result.unwrap_err().attempts(), 1);
/// # });
/// ```
pub struct Retry<E> {
    policy: RetryPolicy,
    should_retry: Option<Predicate<E>>,
    on_retry: Option<Hook<E>>,
    cancel: Option<CancellationToken>,
}

impl<E> std::fmt::Debug for Retry<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retry")
            .field("policy", &self.policy)
            .field(
                "should_retry",
                &self.should_retry.as_ref().map(|_| "<predicate>"),
            )
            .field("on_retry", &self.on_retry.as_ref().map(|_| "<hook>"))
            .field("cancel", &self.cancel)
            .finish()
    }
}

impl<E> Default for Retry<E> {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl<E> Retry<E> {
    /// Start a retry execution with the given policy.
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            should_retry: None,
            on_retry: None,
            cancel: None,
        }
    }

    /// Retry only when the predicate returns true for the error.
    ///
    /// Errors the predicate rejects propagate immediately as
    /// [`RetryError::NotRetryable`], without consuming the remaining
    /// budget. Without a predicate every error is retried.
    pub fn retry_if<P>(mut self, should_retry: P) -> Self
    where
        P: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.should_retry = Some(Box::new(should_retry));
        self
    }

    /// Observe scheduled retries.
    ///
    /// The hook runs once per scheduled retry, before its delay, with a
    /// [`RetryEvent`] describing the failure that triggered it. It is
    /// never called after the final failure.
    ///
    /// The hook is observational only: its return value is ignored and it
    /// cannot alter the schedule. If it panics, the panic is caught and
    /// logged and the retry sequence continues unchanged.
    pub fn on_retry<H>(mut self, hook: H) -> Self
    where
        H: FnMut(&RetryEvent<'_, E>) + Send + 'static,
    {
        self.on_retry = Some(Box::new(hook));
        self
    }

    /// Abort the execution when the token is cancelled.
    ///
    /// The token is checked before each attempt, while an attempt is in
    /// flight, and during each delay. Cancellation produces
    /// [`RetryError::Cancelled`]; a token that never fires leaves behavior
    /// identical to not setting one.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Get the policy this execution will follow.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Drive the operation to a final outcome.
    ///
    /// Calls the operation up to `1 + max_retries` times, sleeping the
    /// policy's delay between failures. The first success wins; otherwise
    /// the error from the final attempt is returned inside
    /// [`RetryError`], along with attempt and elapsed-time accounting.
    pub async fn run<T, F, Fut>(mut self, mut operation: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let started = Instant::now();
        let mut attempt: u32 = 0;
        let mut prev_delay: Option<Duration> = None;

        loop {
            if let Some(token) = &self.cancel {
                if token.is_cancelled() {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("cancelled before attempt {}", attempt + 1);
                    return Err(RetryError::cancelled(attempt, started.elapsed()));
                }
            }

            let outcome = if let Some(token) = &self.cancel {
                tokio::select! {
                    outcome = operation() => outcome,
                    () = token.cancelled() => {
                        #[cfg(feature = "tracing")]
                        tracing::debug!("cancelled during attempt {}", attempt + 1);
                        return Err(RetryError::cancelled(attempt, started.elapsed()));
                    }
                }
            } else {
                operation().await
            };

            let error = match outcome {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if let Some(should_retry) = &self.should_retry {
                if !should_retry(&error) {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("attempt {} failed with a non-retryable error", attempt + 1);
                    return Err(RetryError::not_retryable(
                        error,
                        attempt + 1,
                        started.elapsed(),
                    ));
                }
            }

            match self.policy.delay_with_jitter(attempt, prev_delay) {
                Some(delay) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("attempt {} failed, retrying in {:?}", attempt + 1, delay);

                    if let Some(hook) = self.on_retry.as_mut() {
                        let event = RetryEvent {
                            attempt: attempt + 1,
                            error: &error,
                            delay,
                            elapsed: started.elapsed(),
                        };
                        // A panicking hook must not disturb retry accounting.
                        if std::panic::catch_unwind(AssertUnwindSafe(|| hook(&event))).is_err() {
                            #[cfg(feature = "tracing")]
                            tracing::warn!("on_retry hook panicked on attempt {}", attempt + 1);
                            #[cfg(not(feature = "tracing"))]
                            eprintln!("on_retry hook panicked on attempt {}", attempt + 1);
                        }
                    }

                    if let Some(token) = &self.cancel {
                        tokio::select! {
                            () = sleep(delay) => {}
                            () = token.cancelled() => {
                                #[cfg(feature = "tracing")]
                                tracing::debug!("cancelled during delay before attempt {}", attempt + 2);
                                return Err(RetryError::cancelled(attempt + 1, started.elapsed()));
                            }
                        }
                    } else {
                        sleep(delay).await;
                    }

                    prev_delay = Some(delay);
                    attempt += 1;
                }
                None => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("giving up after {} attempts", attempt + 1);
                    return Err(RetryError::exhausted(error, attempt + 1, started.elapsed()));
                }
            }
        }
    }
}
