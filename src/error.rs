//! Error types for retry execution.

use std::time::Duration;

/// Error returned when a retried operation never succeeds.
///
/// The error from the final attempt is always the primary cause: it is
/// carried in the [`Exhausted`](Self::Exhausted) and
/// [`NotRetryable`](Self::NotRetryable) variants, surfaced through
/// [`last_error`](Self::last_error), and exposed as
/// [`std::error::Error::source`]. Errors from earlier attempts are
/// discarded as the sequence progresses.
///
/// # Examples
///
/// ```rust
/// use resurge::{execute_with, RetryError, RetryPolicy};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let policy = RetryPolicy::default()
///     .with_max_retries(2)
///     .with_base_delay(Duration::from_millis(1));
///
/// let result: Result<(), _> = execute_with(|| async { Err("always fails") }, policy).await;
///
/// match result {
///     Err(RetryError::Exhausted { source, attempts, .. }) => {
///         assert_eq!(source, "always fails");
///         assert_eq!(attempts, 3); // 1 initial + 2 retries
///     }
///     _ => panic!("expected exhaustion"),
/// }
/// # });
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// Every attempt in the budget failed.
    Exhausted {
        /// The error from the final attempt.
        source: E,
        /// Total number of attempts made (initial + retries).
        attempts: u32,
        /// Time from the first attempt until giving up.
        elapsed: Duration,
    },
    /// The retry predicate rejected an error, so no more attempts were made.
    NotRetryable {
        /// The rejected error.
        source: E,
        /// Attempts made, including the one that produced `source`.
        attempts: u32,
        /// Time from the first attempt until the rejection.
        elapsed: Duration,
    },
    /// The cancellation token fired before any attempt succeeded.
    Cancelled {
        /// Attempts that had completed when cancellation was observed.
        attempts: u32,
        /// Time from the first attempt until cancellation.
        elapsed: Duration,
    },
}

impl<E> RetryError<E> {
    /// Create an exhaustion error.
    pub fn exhausted(source: E, attempts: u32, elapsed: Duration) -> Self {
        Self::Exhausted {
            source,
            attempts,
            elapsed,
        }
    }

    /// Create a non-retryable error.
    pub fn not_retryable(source: E, attempts: u32, elapsed: Duration) -> Self {
        Self::NotRetryable {
            source,
            attempts,
            elapsed,
        }
    }

    /// Create a cancellation error.
    pub fn cancelled(attempts: u32, elapsed: Duration) -> Self {
        Self::Cancelled { attempts, elapsed }
    }

    /// Number of attempts that ran before this error was produced.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. }
            | Self::NotRetryable { attempts, .. }
            | Self::Cancelled { attempts, .. } => *attempts,
        }
    }

    /// Time spent between the first attempt and this error.
    pub fn elapsed(&self) -> Duration {
        match self {
            Self::Exhausted { elapsed, .. }
            | Self::NotRetryable { elapsed, .. }
            | Self::Cancelled { elapsed, .. } => *elapsed,
        }
    }

    /// Returns true if the retry budget was spent.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }

    /// Returns true if execution was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Get the error from the last attempt, if one ran to completion.
    ///
    /// `None` only for [`Cancelled`](Self::Cancelled), which can occur
    /// before any attempt finishes.
    pub fn last_error(&self) -> Option<&E> {
        match self {
            Self::Exhausted { source, .. } | Self::NotRetryable { source, .. } => Some(source),
            Self::Cancelled { .. } => None,
        }
    }

    /// Extract the error from the last attempt, discarding metadata.
    pub fn into_last_error(self) -> Option<E> {
        match self {
            Self::Exhausted { source, .. } | Self::NotRetryable { source, .. } => Some(source),
            Self::Cancelled { .. } => None,
        }
    }
}

impl<E: std::fmt::Display> std::fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exhausted {
                source,
                attempts,
                elapsed,
            } => write!(
                f,
                "retries exhausted after {} attempts ({:?}): {}",
                attempts, elapsed, source
            ),
            Self::NotRetryable {
                source, attempts, ..
            } => write!(f, "non-retryable error on attempt {}: {}", attempts, source),
            Self::Cancelled { attempts, elapsed } => {
                write!(f, "cancelled after {} attempts ({:?})", attempts, elapsed)
            }
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Exhausted { source, .. } | Self::NotRetryable { source, .. } => Some(source),
            Self::Cancelled { .. } => None,
        }
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn test_exhausted_display() {
        let err = RetryError::exhausted("connection refused", 4, Duration::from_millis(700));
        let display = format!("{}", err);
        assert!(display.contains("retries exhausted"));
        assert!(display.contains("4 attempts"));
        assert!(display.contains("connection refused"));
    }

    #[test]
    fn test_not_retryable_display() {
        let err = RetryError::not_retryable("bad credentials", 1, Duration::ZERO);
        let display = format!("{}", err);
        assert!(display.contains("non-retryable"));
        assert!(display.contains("attempt 1"));
        assert!(display.contains("bad credentials"));
    }

    #[test]
    fn test_cancelled_display() {
        let err: RetryError<String> = RetryError::cancelled(2, Duration::from_millis(30));
        let display = format!("{}", err);
        assert!(display.contains("cancelled"));
        assert!(display.contains("2 attempts"));
    }

    #[test]
    fn test_accessors() {
        let err = RetryError::exhausted("boom", 4, Duration::from_secs(7));
        assert_eq!(err.attempts(), 4);
        assert_eq!(err.elapsed(), Duration::from_secs(7));
        assert!(err.is_exhausted());
        assert!(!err.is_cancelled());
    }

    #[test]
    fn test_last_error_present_for_failures() {
        let err = RetryError::exhausted("boom", 4, Duration::ZERO);
        assert_eq!(err.last_error(), Some(&"boom"));
        assert_eq!(err.into_last_error(), Some("boom"));

        let err = RetryError::not_retryable("nope", 1, Duration::ZERO);
        assert_eq!(err.into_last_error(), Some("nope"));
    }

    #[test]
    fn test_last_error_absent_when_cancelled() {
        let err: RetryError<String> = RetryError::cancelled(0, Duration::ZERO);
        assert_eq!(err.last_error(), None);
        assert_eq!(err.clone().into_last_error(), None);
        assert!(err.is_cancelled());
    }

    #[test]
    fn test_source_is_last_error() {
        use std::error::Error;

        let inner = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let err = RetryError::exhausted(inner, 4, Duration::ZERO);
        let source = err.source().expect("exhausted should carry a source");
        assert!(source.to_string().contains("reset"));

        let cancelled: RetryError<std::io::Error> = RetryError::cancelled(0, Duration::ZERO);
        assert!(cancelled.source().is_none());
    }
}
