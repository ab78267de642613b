//! Property-based tests for free/busy computation using proptest.
//!
//! These verify the tiling invariants for *any* window and busy list, not just
//! the scenarios in `freebusy_tests.rs`.

use chrono::{DateTime, Duration, TimeZone, Utc};
use freebusy_engine::{compute_time_slots, Interval};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap()
}

/// An offset in minutes within a two-day span, so that busy intervals land
/// before, inside, and after the window.
fn arb_minute() -> impl Strategy<Value = i64> {
    0i64..=2880
}

/// A well-formed interval (start <= end).
fn arb_busy() -> impl Strategy<Value = Interval> {
    (arb_minute(), 0i64..=600).prop_map(|(start, len)| {
        let start = base() + Duration::minutes(start);
        Interval::new(start, start + Duration::minutes(len))
    })
}

/// A non-empty window somewhere in the middle of the span.
fn arb_window() -> impl Strategy<Value = Interval> {
    (300i64..=1500, 1i64..=1200).prop_map(|(start, len)| {
        let start = base() + Duration::minutes(start);
        Interval::new(start, start + Duration::minutes(len))
    })
}

fn arb_busy_list() -> impl Strategy<Value = Vec<Interval>> {
    prop::collection::vec(arb_busy(), 0..24)
}

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Property 1: Slots tile the window exactly
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn slots_tile_window(window in arb_window(), busy in arb_busy_list()) {
        let slots = compute_time_slots(window, &busy).unwrap();

        prop_assert!(!slots.is_empty());
        prop_assert_eq!(slots[0].start, window.start);
        prop_assert_eq!(slots[slots.len() - 1].end, window.end);

        for slot in &slots {
            prop_assert!(slot.start < slot.end, "empty slot: {:?}", slot);
        }
        for pair in slots.windows(2) {
            prop_assert_eq!(pair[0].end, pair[1].start, "gap or overlap between {:?}", pair);
        }
    }
}

// ---------------------------------------------------------------------------
// Property 2: Adjacent slots never share a label
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn adjacent_slots_alternate(window in arb_window(), busy in arb_busy_list()) {
        let slots = compute_time_slots(window, &busy).unwrap();

        for pair in slots.windows(2) {
            prop_assert_ne!(pair[0].free, pair[1].free, "same label twice: {:?}", pair);
        }
    }
}

// ---------------------------------------------------------------------------
// Property 3: Duplicated input is idempotent
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn duplicates_do_not_change_output(window in arb_window(), busy in arb_busy_list()) {
        let once = compute_time_slots(window, &busy).unwrap();

        let mut twice = busy.clone();
        twice.extend(busy.iter().copied());
        let doubled = compute_time_slots(window, &twice).unwrap();

        prop_assert_eq!(once, doubled);
    }
}

// ---------------------------------------------------------------------------
// Property 4: Input order does not matter
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn order_independent(
        window in arb_window(),
        (busy, shuffled) in arb_busy_list().prop_flat_map(|busy| {
            let shuffled = Just(busy.clone()).prop_shuffle();
            (Just(busy), shuffled)
        }),
    ) {
        let a = compute_time_slots(window, &busy).unwrap();
        let b = compute_time_slots(window, &shuffled).unwrap();

        prop_assert_eq!(a, b);
    }
}

// ---------------------------------------------------------------------------
// Property 5: Empty window yields nothing
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn empty_window_is_empty(
        minute in arb_minute(),
        busy in arb_busy_list(),
        start in arb_minute(),
        back in 1i64..=600,
    ) {
        let instant = base() + Duration::minutes(minute);
        let window = Interval::new(instant, instant);

        prop_assert!(compute_time_slots(window, &busy).unwrap().is_empty());

        // Holds for any busy input, malformed entries included.
        let start = base() + Duration::minutes(start);
        let mut input = busy;
        input.push(Interval::new(start, start - Duration::minutes(back)));
        prop_assert!(compute_time_slots(window, &input).unwrap().is_empty());
    }
}

// ---------------------------------------------------------------------------
// Property 6: Every instant is labeled correctly
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn busy_slots_cover_exactly_the_clipped_input(
        window in arb_window(),
        busy in arb_busy_list(),
        probe in 0i64..1200,
    ) {
        let slots = compute_time_slots(window, &busy).unwrap();
        let point = window.start + Duration::minutes(probe);
        prop_assume!(point < window.end);

        let covered = busy.iter().any(|b| b.start <= point && point < b.end);
        let slot = slots
            .iter()
            .find(|s| s.start <= point && point < s.end)
            .expect("every instant in the window belongs to a slot");

        prop_assert_eq!(slot.free, !covered);
    }
}

// ---------------------------------------------------------------------------
// Property 7: Any malformed entry fails the whole call
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn malformed_entry_rejected(
        window in arb_window(),
        busy in arb_busy_list(),
        start in arb_minute(),
        back in 1i64..=600,
    ) {
        let start = base() + Duration::minutes(start);
        let bad = Interval::new(start, start - Duration::minutes(back));
        let mut input = busy;
        let index = input.len() / 2;
        input.insert(index, bad);

        prop_assert!(compute_time_slots(window, &input).is_err());
    }
}
