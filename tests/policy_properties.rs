//! Property-based tests for retry policy delay arithmetic.

use proptest::prelude::*;
use resurge::RetryPolicy;
use std::time::Duration;

fn build_policy(max_retries: u32, base_ms: u64, max_ms: u64) -> RetryPolicy {
    RetryPolicy::default()
        .with_max_retries(max_retries)
        .with_base_delay(Duration::from_millis(base_ms))
        .with_max_delay(Duration::from_millis(max_ms))
}

proptest! {
    #[test]
    fn prop_delays_never_exceed_cap(
        max_retries in 0u32..32,
        base_ms in 1u64..5_000,
        max_ms in 1u64..20_000,
    ) {
        let policy = build_policy(max_retries, base_ms, max_ms);

        for attempt in 0..max_retries {
            let delay = policy.delay_for_attempt(attempt);
            prop_assert!(delay.is_some());
            prop_assert!(delay.unwrap() <= Duration::from_millis(max_ms));
        }
    }

    #[test]
    fn prop_budget_boundary_is_exact(max_retries in 0u32..64) {
        let policy = build_policy(max_retries, 10, 1_000);

        for attempt in 0..max_retries {
            prop_assert!(policy.delay_for_attempt(attempt).is_some());
        }
        prop_assert_eq!(policy.delay_for_attempt(max_retries), None);
        prop_assert_eq!(policy.delay_for_attempt(max_retries.saturating_add(7)), None);
    }

    #[test]
    fn prop_first_delay_is_base_clamped(
        base_ms in 1u64..60_000,
        max_ms in 1u64..60_000,
    ) {
        let policy = build_policy(1, base_ms, max_ms);
        let expected = Duration::from_millis(base_ms.min(max_ms));
        prop_assert_eq!(policy.delay_for_attempt(0), Some(expected));
    }

    #[test]
    fn prop_delays_nondecreasing_until_budget(
        max_retries in 1u32..24,
        base_ms in 1u64..2_000,
        max_ms in 1u64..30_000,
    ) {
        let policy = build_policy(max_retries, base_ms, max_ms);
        let delays: Vec<_> = (0..max_retries)
            .map(|attempt| policy.delay_for_attempt(attempt).unwrap())
            .collect();

        for pair in delays.windows(2) {
            prop_assert!(pair[1] >= pair[0]);
        }
    }

    #[test]
    fn prop_delay_doubles_while_under_cap(
        max_retries in 2u32..16,
        base_ms in 1u64..500,
        max_ms in 1_000u64..60_000,
    ) {
        let policy = build_policy(max_retries, base_ms, max_ms);

        for attempt in 0..max_retries - 1 {
            let current = policy.delay_for_attempt(attempt).unwrap();
            let next = policy.delay_for_attempt(attempt + 1).unwrap();
            // A capped value equals max_ms, so strictly-below means uncapped.
            if next < Duration::from_millis(max_ms) {
                prop_assert_eq!(next, current * 2);
            }
        }
    }
}

#[cfg(feature = "async")]
mod attempt_properties {
    use super::*;
    use resurge::testing::AttemptLog;

    proptest! {
        #[test]
        fn prop_total_attempts_is_budget_plus_one(
            max_retries in 0u32..6,
            base_ms in 1u64..10,
        ) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .start_paused(true)
                .build()
                .unwrap();

            let policy = build_policy(max_retries, base_ms, base_ms * 2);
            let log = AttemptLog::new();
            let op_log = log.clone();

            let result = rt.block_on(resurge::execute_with(
                move || {
                    let log = op_log.clone();
                    async move {
                        log.begin();
                        Err::<(), _>("always fails")
                    }
                },
                policy,
            ));

            prop_assert!(result.is_err());
            prop_assert_eq!(log.attempts(), max_retries + 1);
        }
    }
}
