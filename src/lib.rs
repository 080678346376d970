//! # Resurge
//!
//! > *"Fall seven times, rise the eighth."*
//!
//! A Rust library for bounded retries with capped exponential backoff.
//!
//! ## Philosophy
//!
//! **Resurge** keeps the two halves of retrying apart:
//! - **Policy** = pure data (clone it, inspect it, test it without a runtime)
//! - **Executor** = one sequential loop (attempt, wait, try again)
//!
//! A [`RetryPolicy`] decides *whether* and *how long*; the executor in
//! [`execute`](crate::execute()) does the waiting. Every execution owns its
//! own loop state, so concurrent retries never interfere with each other,
//! and the first success always returns immediately.
//!
//! ## Quick Example
//!
//! ```rust
//! use resurge::{execute_with, RetryPolicy};
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let calls = Arc::new(AtomicU32::new(0));
//!
//! // Two transient failures, then success.
//! let policy = RetryPolicy::default()
//!     .with_max_retries(3)
//!     .with_base_delay(Duration::from_millis(1));
//!
//! let value = execute_with(
//!     || {
//!         let calls = calls.clone();
//!         async move {
//!             if calls.fetch_add(1, Ordering::SeqCst) < 2 {
//!                 Err("connection reset")
//!             } else {
//!                 Ok("profile loaded")
//!             }
//!         }
//!     },
//!     policy,
//! )
//! .await
//! .unwrap();
//!
//! assert_eq!(value, "profile loaded");
//! assert_eq!(calls.load(Ordering::SeqCst), 3);
//! # });
//! ```
//!
//! For more examples, see the runnable programs under `demos/`.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod error;
#[cfg(feature = "async")]
pub mod execute;
pub mod policy;
pub mod testing;

#[cfg(feature = "serde")]
mod serde_impl;

// Re-exports
pub use error::RetryError;
#[cfg(feature = "async")]
pub use execute::{execute, execute_with, CancellationToken, Retry};
pub use policy::{Jitter, RetryEvent, RetryPolicy};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::RetryError;
    #[cfg(feature = "async")]
    pub use crate::execute::{execute, execute_with, CancellationToken, Retry};
    pub use crate::policy::{Jitter, RetryEvent, RetryPolicy};
}
