//! Compute a gap-filled free/busy slot sequence for a query window.
//!
//! Busy intervals are validated, clipped to the window, sorted, and merged into
//! non-overlapping busy periods. A single sweep then interleaves the gaps as
//! free slots, so the output tiles the window exactly with alternating labels.

use crate::error::{FreeBusyError, Result};
use crate::interval::{Interval, TimeSlot};

/// Merge overlapping or adjacent busy periods, clipped to the given window.
///
/// Returns a sorted, non-overlapping list of non-empty intervals. Intervals
/// that only touch the window boundary, or that collapse to zero length after
/// clipping, are dropped.
fn merge_busy_periods(busy: &[Interval], window: &Interval) -> Vec<Interval> {
    let mut intervals: Vec<Interval> = busy
        .iter()
        .filter(|b| b.intersects(window))
        .map(|b| b.clip_to(window))
        .filter(|b| !b.is_empty())
        .collect();

    if intervals.is_empty() {
        return Vec::new();
    }

    // Sort by start time (then by end time for stability).
    intervals.sort_by_key(|i| (i.start, i.end));

    let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        if let Some(last) = merged.last_mut() {
            if interval.start <= last.end {
                // Overlapping or abutting: extend the current period.
                last.end = last.end.max(interval.end);
                continue;
            }
        }
        merged.push(interval);
    }

    merged
}

/// Tile `window` with free and busy slots derived from `busy`.
///
/// The result is sorted by start, contiguous, covers exactly
/// `[window.start, window.end)`, and never has two adjacent slots with the same
/// label. An empty window (`start >= end`) yields an empty sequence whatever
/// `busy` holds. Callers are expected to reject inverted windows before
/// getting here.
///
/// # Errors
///
/// Returns [`FreeBusyError::MalformedInterval`] for the first busy interval
/// whose start is after its end. No partial result is produced.
pub fn compute_time_slots(window: Interval, busy: &[Interval]) -> Result<Vec<TimeSlot>> {
    if window.is_empty() {
        return Ok(Vec::new());
    }

    if let Some((index, bad)) = busy.iter().enumerate().find(|(_, b)| b.start > b.end) {
        return Err(FreeBusyError::MalformedInterval {
            index,
            start: bad.start,
            end: bad.end,
        });
    }

    let merged = merge_busy_periods(busy, &window);

    let mut slots = Vec::with_capacity(merged.len() * 2 + 1);
    let mut cursor = window.start;

    for period in &merged {
        if cursor < period.start {
            slots.push(TimeSlot::free(cursor, period.start));
        }
        slots.push(TimeSlot::busy(period.start, period.end));
        cursor = cursor.max(period.end);
    }

    // Trailing free slot after the last busy period.
    if cursor < window.end {
        slots.push(TimeSlot::free(cursor, window.end));
    }

    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, hour, min, 0).unwrap()
    }

    fn window() -> Interval {
        Interval::new(at(9, 0), at(17, 0))
    }

    #[test]
    fn merge_drops_zero_length_after_clipping() {
        let busy = [
            Interval::new(at(12, 0), at(12, 0)),
            Interval::new(at(8, 0), at(9, 0)),
            Interval::new(at(17, 0), at(18, 0)),
        ];
        assert!(merge_busy_periods(&busy, &window()).is_empty());
    }

    #[test]
    fn merge_joins_abutting_and_contained() {
        let busy = [
            Interval::new(at(13, 0), at(14, 0)),
            Interval::new(at(10, 0), at(12, 0)),
            Interval::new(at(10, 30), at(11, 0)),
            Interval::new(at(12, 0), at(13, 0)),
        ];
        let merged = merge_busy_periods(&busy, &window());
        assert_eq!(merged, vec![Interval::new(at(10, 0), at(14, 0))]);
    }

    #[test]
    fn merge_keeps_disjoint_periods_sorted() {
        let busy = [
            Interval::new(at(15, 0), at(16, 0)),
            Interval::new(at(10, 0), at(11, 0)),
        ];
        let merged = merge_busy_periods(&busy, &window());
        assert_eq!(
            merged,
            vec![
                Interval::new(at(10, 0), at(11, 0)),
                Interval::new(at(15, 0), at(16, 0)),
            ]
        );
    }
}
