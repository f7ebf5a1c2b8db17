//! Closed-interval overlap test for booking spans.
//!
//! Two spans intersect unless one starts strictly after the other ends, so
//! bookings that merely touch (one ends at the instant the next starts) are
//! treated as conflicting.

use crate::models::BookingInterval;

impl BookingInterval {
    pub fn new(start: chrono::NaiveDateTime, end: chrono::NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn intersects(&self, other: &BookingInterval) -> bool {
        self.start <= other.end && self.end >= other.start
    }
}

/// Linear scan of `existing` for anything `candidate` intersects.
pub fn conflicts_with_any(candidate: &BookingInterval, existing: &[BookingInterval]) -> bool {
    existing.iter().any(|taken| candidate.intersects(taken))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn t(day: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2030, 1, day)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn span(a: NaiveDateTime, b: NaiveDateTime) -> BookingInterval {
        BookingInterval::new(a, b)
    }

    #[test]
    fn test_identical_and_nested_spans_intersect() {
        let taken = span(t(1, 10, 0, 0), t(11, 10, 0, 0));
        assert!(span(t(1, 10, 0, 0), t(11, 10, 0, 0)).intersects(&taken));
        assert!(span(t(3, 0, 0, 0), t(4, 0, 0, 0)).intersects(&taken));
        assert!(span(t(1, 0, 0, 0), t(20, 0, 0, 0)).intersects(&taken));
    }

    #[test]
    fn test_touching_boundaries_intersect() {
        let taken = span(t(1, 10, 0, 0), t(11, 10, 0, 0));
        assert!(span(t(11, 10, 0, 0), t(21, 10, 0, 0)).intersects(&taken));
        assert!(span(t(1, 0, 0, 0), t(1, 10, 0, 0)).intersects(&taken));
    }

    #[test]
    fn test_disjoint_spans_do_not_intersect() {
        let taken = span(t(1, 10, 0, 0), t(11, 10, 0, 0));
        assert!(!span(t(11, 10, 0, 1), t(21, 10, 0, 0)).intersects(&taken));
        assert!(!span(t(1, 0, 0, 0), t(1, 9, 59, 59)).intersects(&taken));
    }

    #[test]
    fn test_scan_over_existing() {
        let existing = vec![
            span(t(1, 0, 0, 0), t(2, 0, 0, 0)),
            span(t(5, 0, 0, 0), t(6, 0, 0, 0)),
        ];
        assert!(!conflicts_with_any(&span(t(3, 0, 0, 0), t(4, 0, 0, 0)), &existing));
        assert!(conflicts_with_any(&span(t(4, 0, 0, 0), t(5, 0, 0, 0)), &existing));
        assert!(!conflicts_with_any(&span(t(4, 0, 0, 0), t(5, 0, 0, 0)), &[]));
    }
}
