//! Property-based tests for IdGenerator.
//!
//! - Property 1: Ids are strictly increasing whatever the clock does
//! - Property 2: Splitting an id recovers its parts

use proptest::prelude::*;

use super::clock::ManualClock;
use super::generator::{IdGenerator, from_parts, parse};

/// Strategy for clock moves in milliseconds, including regressions.
fn clock_steps() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(-5i64..5i64, 1..200)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property 1: Monotonic Ids
    ///
    /// *For any* sequence of clock moves (forward, stalled or backwards),
    /// every id is greater than the one before it.
    #[test]
    fn prop_ids_strictly_increase(steps in clock_steps(), seed in any::<u64>()) {
        let clock = ManualClock::from_millis(1_000_000);
        let mut ids = IdGenerator::with_seed(&clock, seed);
        let mut now_ms: u64 = 1_000_000;
        let mut previous = ids.next_id();

        for step in steps {
            now_ms = now_ms.saturating_add_signed(step);
            clock.set(now_ms * 1_000_000);
            let next = ids.next_id();
            prop_assert!(next > previous, "{} !> {}", next, previous);
            previous = next;
        }
    }

    /// Property 2: Parts Round-Trip
    ///
    /// *For any* timestamp below 2^48 and random part below 2^80, parsing
    /// the combined id yields the same parts.
    #[test]
    fn prop_parse_recovers_parts(
        timestamp_ms in 0u64..(1u64 << 48),
        random in 0u128..(1u128 << 80),
    ) {
        prop_assert_eq!(parse(from_parts(timestamp_ms, random)), (timestamp_ms, random));
    }
}
