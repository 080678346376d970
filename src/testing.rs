//! Testing utilities for code built on resurge.
//!
//! This module provides an attempt counter for instrumenting operations,
//! assertion macros for the executor's error variants, and property-based
//! testing support.
//!
//! # Examples
//!
//! ## AttemptLog
//!
//! ```rust
//! use resurge::testing::AttemptLog;
//!
//! let log = AttemptLog::new();
//! assert_eq!(log.begin(), 0); // first attempt, 0-indexed
//! assert_eq!(log.begin(), 1);
//! assert_eq!(log.attempts(), 2);
//! ```
//!
//! ## Assertion macros
//!
//! ```rust
//! use resurge::{assert_exhausted, RetryError};
//! use std::time::Duration;
//!
//! let result: Result<(), _> = Err(RetryError::exhausted("boom", 4, Duration::ZERO));
//! let last = assert_exhausted!(result, attempts = 4);
//! assert_eq!(last, "boom");
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// A shared counter of operation invocations.
///
/// Operations under test call [`begin`](Self::begin) on entry; assertions
/// read [`attempts`](Self::attempts) afterwards. The counter is atomic, so
/// one log can be shared across concurrent executions to count their
/// combined invocations.
///
/// # Example
///
/// ```rust
/// use resurge::testing::AttemptLog;
/// use resurge::{execute_with, RetryPolicy};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let log = AttemptLog::new();
/// let policy = RetryPolicy::default()
///     .with_max_retries(5)
///     .with_base_delay(Duration::from_millis(1));
///
/// let value = execute_with(
///     || {
///         let log = log.clone();
///         async move {
///             if log.begin() < 2 {
///                 Err("not yet")
///             } else {
///                 Ok("done")
///             }
///         }
///     },
///     policy,
/// )
/// .await
/// .unwrap();
///
/// assert_eq!(value, "done");
/// assert_eq!(log.attempts(), 3);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct AttemptLog {
    attempts: AtomicU32,
}

impl AttemptLog {
    /// Create a fresh, shareable log.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Record the start of an attempt, returning its 0-based index.
    pub fn begin(&self) -> u32 {
        self.attempts.fetch_add(1, Ordering::SeqCst)
    }

    /// Number of attempts recorded so far.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

/// Assert that a result is [`RetryError::Exhausted`](crate::RetryError::Exhausted).
///
/// Evaluates to the error from the final attempt, so follow-up assertions
/// can inspect it. The two-argument form also checks the attempt count.
///
/// # Example
///
/// ```rust
/// use resurge::{assert_exhausted, RetryError};
/// use std::time::Duration;
///
/// let result: Result<(), _> = Err(RetryError::exhausted("timeout", 3, Duration::ZERO));
/// let last = assert_exhausted!(result, attempts = 3);
/// assert_eq!(last, "timeout");
/// ```
#[macro_export]
macro_rules! assert_exhausted {
    ($result:expr) => {
        match $result {
            Err($crate::RetryError::Exhausted { source, .. }) => source,
            Err(other) => panic!("Expected Exhausted, got: {:?}", other),
            Ok(_) => panic!("Expected Exhausted, got Ok"),
        }
    };
    ($result:expr, attempts = $attempts:expr) => {
        match $result {
            Err($crate::RetryError::Exhausted {
                source, attempts, ..
            }) => {
                assert_eq!(attempts, $attempts, "wrong attempt count");
                source
            }
            Err(other) => panic!("Expected Exhausted, got: {:?}", other),
            Ok(_) => panic!("Expected Exhausted, got Ok"),
        }
    };
}

/// Assert that a result is [`RetryError::Cancelled`](crate::RetryError::Cancelled).
///
/// Evaluates to the number of attempts that had completed when cancellation
/// was observed. The two-argument form also checks that count.
///
/// # Example
///
/// ```rust
/// use resurge::{assert_cancelled, RetryError};
/// use std::time::Duration;
///
/// let result: Result<(), RetryError<String>> = Err(RetryError::cancelled(2, Duration::ZERO));
/// assert_cancelled!(result, attempts = 2);
/// ```
#[macro_export]
macro_rules! assert_cancelled {
    ($result:expr) => {
        match $result {
            Err($crate::RetryError::Cancelled { attempts, .. }) => attempts,
            Err(other) => panic!("Expected Cancelled, got: {:?}", other),
            Ok(_) => panic!("Expected Cancelled, got Ok"),
        }
    };
    ($result:expr, attempts = $attempts:expr) => {
        match $result {
            Err($crate::RetryError::Cancelled { attempts, .. }) => {
                assert_eq!(attempts, $attempts, "wrong attempt count");
                attempts
            }
            Err(other) => panic!("Expected Cancelled, got: {:?}", other),
            Ok(_) => panic!("Expected Cancelled, got Ok"),
        }
    };
}

#[cfg(feature = "proptest")]
use proptest::prelude::*;

#[cfg(feature = "proptest")]
impl Arbitrary for crate::Jitter {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            Just(crate::Jitter::Off),
            Just(crate::Jitter::Full),
            Just(crate::Jitter::Equal),
            Just(crate::Jitter::Decorrelated),
        ]
        .boxed()
    }
}

#[cfg(feature = "proptest")]
impl Arbitrary for crate::RetryPolicy {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    // Small policies whose schedules run in test-friendly time: up to
    // 8 retries, base delays up to 250ms, caps up to 2s.
    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (0u32..=8, 1u64..=250, 1u64..=2_000, any::<crate::Jitter>())
            .prop_map(|(max_retries, base_ms, max_ms, jitter)| {
                crate::RetryPolicy::default()
                    .with_max_retries(max_retries)
                    .with_base_delay(std::time::Duration::from_millis(base_ms))
                    .with_max_delay(std::time::Duration::from_millis(max_ms))
                    .with_jitter(jitter)
            })
            .boxed()
    }
}
