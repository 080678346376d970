//! Retry policy types and delay arithmetic.

use std::time::Duration;

/// A retry policy describing how failed operations are retried.
///
/// Policies are pure data - they describe retry behavior but don't execute it.
/// This makes them easy to test, clone, and inspect. The executor in
/// [`crate::execute`] consults the policy once per failed attempt.
///
/// Delays grow exponentially from [`base_delay`](Self::base_delay) and are
/// clamped to [`max_delay`](Self::max_delay):
///
/// ```text
/// delay(attempt) = min(base_delay * 2^attempt, max_delay)
/// ```
///
/// The default policy retries 3 times (4 attempts total), starting at 1s
/// and capping each delay at 10s.
///
/// # Examples
///
/// ```rust
/// use resurge::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::default()
///     .with_max_retries(5)
///     .with_base_delay(Duration::from_millis(100))
///     .with_max_delay(Duration::from_secs(1));
///
/// assert_eq!(policy.max_retries(), 5);
/// assert_eq!(policy.base_delay(), Duration::from_millis(100));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
    max_delay: Duration,
    jitter: Jitter,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10_000),
            jitter: Jitter::Off,
        }
    }
}

/// How randomness is mixed into computed delays.
///
/// All variants are available regardless of features, but the randomized
/// ones need the `jitter` feature; without it they degrade to the plain
/// exponential delay so the documented schedule stays exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Jitter {
    /// No jitter. Delays follow the exponential schedule exactly.
    #[default]
    Off,
    /// Random delay between 0 and the computed delay (AWS recommended).
    Full,
    /// Half the computed delay plus a random value up to the other half.
    ///
    /// Keeps a floor under every delay while still spreading retries.
    Equal,
    /// Random delay between the computed delay and 3x the previous delay.
    ///
    /// Provides good spread while maintaining progression.
    Decorrelated,
}

/// Information about a scheduled retry, passed to the `on_retry` hook.
///
/// An event is emitted only when a retry will actually happen, so
/// [`delay`](Self::delay) is always the wait that is about to occur.
/// No event is emitted for the final failure.
#[derive(Debug, Clone)]
pub struct RetryEvent<'a, E> {
    /// 1-based ordinal of the retry about to run.
    ///
    /// Equivalently, the number of attempts that have failed so far.
    pub attempt: u32,
    /// The error from the attempt that just failed.
    pub error: &'a E,
    /// How long the executor will sleep before the retry.
    pub delay: Duration,
    /// Total elapsed time since the first attempt started.
    pub elapsed: Duration,
}

impl RetryPolicy {
    /// Set the maximum number of retries.
    ///
    /// This does not include the initial attempt: `with_max_retries(3)`
    /// means up to 4 total attempts (1 initial + 3 retries), and
    /// `with_max_retries(0)` disables retrying entirely.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use resurge::RetryPolicy;
    ///
    /// let policy = RetryPolicy::default().with_max_retries(0);
    /// assert_eq!(policy.delay_for_attempt(0), None);
    /// ```
    pub fn with_max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    /// Set the delay before the first retry.
    ///
    /// Subsequent delays double from here until they hit the cap.
    pub fn with_base_delay(mut self, d: Duration) -> Self {
        self.base_delay = d;
        self
    }

    /// Set the inclusive upper bound on every delay.
    ///
    /// Delays never exceed this value, even after jitter.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use resurge::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::default()
    ///     .with_max_retries(10)
    ///     .with_base_delay(Duration::from_millis(100))
    ///     .with_max_delay(Duration::from_millis(500));
    ///
    /// // 100ms, 200ms, 400ms, then pinned at 500ms
    /// assert_eq!(policy.delay_for_attempt(3), Some(Duration::from_millis(500)));
    /// assert_eq!(policy.delay_for_attempt(9), Some(Duration::from_millis(500)));
    /// ```
    pub fn with_max_delay(mut self, d: Duration) -> Self {
        self.max_delay = d;
        self
    }

    /// Set the jitter mode.
    ///
    /// **Note**: The randomized modes require the `jitter` feature. Without
    /// it they fall back to the deterministic schedule.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use resurge::{Jitter, RetryPolicy};
    ///
    /// let policy = RetryPolicy::default().with_jitter(Jitter::Full);
    /// assert_eq!(policy.jitter(), Jitter::Full);
    /// ```
    pub fn with_jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = jitter;
        self
    }

    /// Get the maximum number of retries.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Get the delay before the first retry.
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Get the delay cap.
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Get the jitter mode.
    pub fn jitter(&self) -> Jitter {
        self.jitter
    }

    /// Calculate the delay before retry N (0-indexed), without jitter.
    ///
    /// Returns `None` once the retry budget is spent, which is the
    /// executor's signal to stop. The multiplication saturates, so absurd
    /// inputs pin to `max_delay` instead of overflowing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use resurge::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::default();
    ///
    /// assert_eq!(policy.delay_for_attempt(0), Some(Duration::from_millis(1000)));
    /// assert_eq!(policy.delay_for_attempt(1), Some(Duration::from_millis(2000)));
    /// assert_eq!(policy.delay_for_attempt(2), Some(Duration::from_millis(4000)));
    /// assert_eq!(policy.delay_for_attempt(3), None); // budget spent
    /// ```
    pub fn delay_for_attempt(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_retries {
            return None;
        }

        let delay = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(self.max_delay);

        Some(delay)
    }

    /// Calculate the delay with jitter applied.
    ///
    /// This is used internally by the retry executor.
    #[doc(hidden)]
    pub fn delay_with_jitter(
        &self,
        attempt: u32,
        prev_delay: Option<Duration>,
    ) -> Option<Duration> {
        let delay = self.delay_for_attempt(attempt)?;
        Some(self.jitter.apply(delay, prev_delay, self.max_delay))
    }
}

impl Jitter {
    /// Apply this jitter mode to a computed delay.
    ///
    /// # Arguments
    ///
    /// * `delay` - The computed delay before jitter
    /// * `prev_delay` - The previously slept delay (for [`Jitter::Decorrelated`])
    /// * `max_delay` - Cap on the final delay
    pub fn apply(
        self,
        delay: Duration,
        #[cfg_attr(not(feature = "jitter"), allow(unused_variables))] prev_delay: Option<Duration>,
        max_delay: Duration,
    ) -> Duration {
        let jittered = match self {
            Jitter::Off => delay,
            #[cfg(feature = "jitter")]
            Jitter::Full => {
                use rand::Rng;
                let max_millis = delay.as_millis() as u64;
                if max_millis == 0 {
                    Duration::ZERO
                } else {
                    Duration::from_millis(rand::rng().random_range(0..=max_millis))
                }
            }
            #[cfg(feature = "jitter")]
            Jitter::Equal => {
                use rand::Rng;
                let half = delay / 2;
                let spread_millis = half.as_millis() as u64;
                if spread_millis == 0 {
                    delay
                } else {
                    half + Duration::from_millis(rand::rng().random_range(0..=spread_millis))
                }
            }
            #[cfg(feature = "jitter")]
            Jitter::Decorrelated => {
                use rand::Rng;
                let prev = prev_delay.unwrap_or(delay);
                let min_millis = delay.as_millis() as u64;
                let max_millis = (prev.as_millis() as u64).saturating_mul(3);
                if max_millis <= min_millis {
                    delay
                } else {
                    Duration::from_millis(rand::rng().random_range(min_millis..=max_millis))
                }
            }
            #[cfg(not(feature = "jitter"))]
            _ => delay,
        };

        jittered.min(max_delay)
    }
}
