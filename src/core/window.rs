//! Time windows and the focus-window rules shared by the viewport and the brush

use serde::{Deserialize, Serialize};

/// Epoch milliseconds
pub type Millis = i64;

pub const MINUTE_MS: Millis = 60_000;
pub const HOUR_MS: Millis = 60 * MINUTE_MS;

/// Default focus pane width: 3.5 hours of data
pub const FOCUS_SPAN: Millis = 3 * HOUR_MS + 30 * MINUTE_MS;

/// A time range with `end > start`. Both ends are inclusive for membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: Millis,
    pub end: Millis,
}

impl TimeWindow {
    pub fn new(start: Millis, end: Millis) -> Self {
        debug_assert!(end > start, "window end must be after start");
        Self { start, end }
    }

    pub fn width(&self) -> Millis {
        self.end - self.start
    }

    pub fn contains(&self, t: Millis) -> bool {
        t >= self.start && t <= self.end
    }

    /// True when the window shares at least one instant with `[lo, hi]`
    pub fn intersects(&self, lo: Millis, hi: Millis) -> bool {
        self.start <= hi && self.end >= lo
    }
}

/// The live-mode window for a data extent.
///
/// Ends at `hi` with width `span`. When the history is shorter than `span` (but
/// not a single instant) the window is the full history instead.
pub fn follow_latest((lo, hi): (Millis, Millis), span: Millis) -> TimeWindow {
    let available = hi - lo;
    if available > 0 && available < span {
        TimeWindow::new(lo, hi)
    } else {
        TimeWindow::new(hi - span, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_span_is_three_and_a_half_hours() {
        assert_eq!(FOCUS_SPAN, 12_600_000);
    }

    #[test]
    fn test_follow_latest_full_width() {
        let w = follow_latest((0, 4 * HOUR_MS), FOCUS_SPAN);
        assert_eq!(w, TimeWindow::new(HOUR_MS / 2, 4 * HOUR_MS));
        assert_eq!(w.width(), FOCUS_SPAN);
    }

    #[test]
    fn test_follow_latest_short_history_uses_full_range() {
        let w = follow_latest((0, 2 * HOUR_MS), FOCUS_SPAN);
        assert_eq!(w, TimeWindow::new(0, 2 * HOUR_MS));
    }

    #[test]
    fn test_follow_latest_single_instant() {
        let w = follow_latest((HOUR_MS, HOUR_MS), FOCUS_SPAN);
        assert_eq!(w.end, HOUR_MS);
        assert_eq!(w.width(), FOCUS_SPAN);
    }

    #[test]
    fn test_intersects_edges() {
        let w = TimeWindow::new(10, 20);
        assert!(w.intersects(20, 30));
        assert!(w.intersects(0, 10));
        assert!(!w.intersects(21, 30));
        assert!(w.contains(10) && w.contains(20) && !w.contains(21));
    }
}
