//! Brush correction: the context-pane selection can be slid but never resized
//!
//! Raw drag extents of any width are re-derived into a window of exactly the
//! focus span. The decision between pinning to the latest sample and pushing
//! forward from the drag start compares against the full dataset's latest
//! timestamp (from the sample store), not the rendered context domain.

use tracing::debug;

use super::window::{Millis, TimeWindow};

/// Translates raw brush extents into focus windows
#[derive(Debug, Clone, Copy)]
pub struct BrushController {
    span: Millis,
}

impl BrushController {
    pub fn new(span: Millis) -> Self {
        Self { span }
    }

    pub fn span(&self) -> Millis {
        self.span
    }

    /// Correct a raw selection against the data extent `[lo, hi]`.
    ///
    /// Applying this to its own output returns the output unchanged, so the
    /// corrected extent can be fed back into the brush control without
    /// oscillating.
    pub fn on_selection_changed(&self, raw: (Millis, Millis), (lo, hi): (Millis, Millis)) -> TimeWindow {
        let available = hi - lo;
        if available > 0 && available < self.span {
            // Not enough history for a full-width window
            return TimeWindow::new(lo, hi);
        }

        let (start, end) = if raw.0 <= raw.1 { raw } else { (raw.1, raw.0) };

        if end - start == self.span && start <= hi && end >= lo {
            return TimeWindow::new(start, end);
        }

        let corrected = if start + self.span > hi {
            TimeWindow::new(hi - self.span, hi)
        } else {
            let start = start.max(lo);
            if start + self.span > hi {
                TimeWindow::new(hi - self.span, hi)
            } else {
                TimeWindow::new(start, start + self.span)
            }
        };

        debug!(
            raw_start = start,
            raw_end = end,
            start = corrected.start,
            end = corrected.end,
            "Brush extent corrected"
        );
        corrected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::window::{FOCUS_SPAN, HOUR_MS, MINUTE_MS};

    const T0: Millis = 1_700_000_000_000;

    fn h(hours: f64) -> Millis {
        T0 + (hours * HOUR_MS as f64) as Millis
    }

    fn brush() -> BrushController {
        BrushController::new(FOCUS_SPAN)
    }

    #[test]
    fn test_exact_width_inside_is_accepted() {
        let w = brush().on_selection_changed((h(0.0), h(3.5)), (h(0.0), h(4.0)));
        assert_eq!(w, TimeWindow::new(h(0.0), h(3.5)));
    }

    #[test]
    fn test_wide_drag_past_latest_pins_to_latest() {
        let w = brush().on_selection_changed((h(3.0), h(6.8)), (h(0.0), h(4.0)));
        assert_eq!(w, TimeWindow::new(h(0.5), h(4.0)));
    }

    #[test]
    fn test_narrow_drag_is_pushed_forward_from_start() {
        let data = (h(0.0), h(10.0));
        let w = brush().on_selection_changed((h(2.0), h(2.5)), data);
        assert_eq!(w, TimeWindow::new(h(2.0), h(5.5)));
    }

    #[test]
    fn test_reversed_extent_is_normalized() {
        let data = (h(0.0), h(10.0));
        let w = brush().on_selection_changed((h(2.5), h(2.0)), data);
        assert_eq!(w, TimeWindow::new(h(2.0), h(5.5)));
    }

    #[test]
    fn test_disjoint_extents_are_pulled_back_into_data() {
        let data = (h(0.0), h(10.0));

        let before = brush().on_selection_changed((h(-9.0), h(-8.0)), data);
        assert_eq!(before, TimeWindow::new(h(0.0), h(3.5)));

        let after = brush().on_selection_changed((h(20.0), h(23.5)), data);
        assert_eq!(after, TimeWindow::new(h(6.5), h(10.0)));
    }

    #[test]
    fn test_short_history_clamps_to_full_range() {
        let data = (h(0.0), h(2.0));
        let w = brush().on_selection_changed((h(1.0), h(1.2)), data);
        assert_eq!(w, TimeWindow::new(h(0.0), h(2.0)));
    }

    #[test]
    fn test_correction_is_idempotent() {
        let b = brush();
        let data = (h(0.0), h(24.0));
        let raws = [
            (h(3.0), h(6.8)),
            (h(23.0), h(23.1)),
            (h(-5.0), h(1.0)),
            (h(1.0), h(1.0) + 7 * MINUTE_MS),
            (h(30.0), h(31.0)),
            (h(10.0), h(13.5)),
        ];
        for raw in raws {
            let once = b.on_selection_changed(raw, data);
            let twice = b.on_selection_changed((once.start, once.end), data);
            assert_eq!(once, twice, "raw {:?} not a fixed point", raw);
            assert_eq!(once.width(), FOCUS_SPAN);
            assert!(once.intersects(data.0, data.1));
        }
    }
}
