//! Container layout and resize debouncing

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::timers::{TimerHandle, TimerKind, TimerQueue};
use super::window::Millis;

/// Space reserved around the chart area for axes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Padding {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Default for Padding {
    fn default() -> Self {
        Self { top: 20.0, right: 10.0, bottom: 30.0, left: 10.0 }
    }
}

/// Measured container size and the pane heights derived from it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    pub container_width: f32,
    pub container_height: f32,
    /// Container minus horizontal padding
    pub chart_width: f32,
    /// Container minus vertical padding
    pub chart_height: f32,
    pub focus_height: f32,
    pub context_height: f32,
}

impl LayoutMetrics {
    pub fn measure(
        container_width: f32,
        container_height: f32,
        padding: &Padding,
        focus_ratio: f32,
        context_ratio: f32,
    ) -> Self {
        let chart_width = (container_width - padding.left - padding.right).max(0.0);
        let chart_height = (container_height - padding.top - padding.bottom).max(0.0);
        Self {
            container_width,
            container_height,
            chart_width,
            chart_height,
            focus_height: chart_height * focus_ratio,
            context_height: chart_height * context_ratio,
        }
    }

    pub fn same_size(&self, width: f32, height: f32) -> bool {
        self.container_width == width && self.container_height == height
    }
}

/// Trailing debounce over raw resize notifications
///
/// Each notification re-arms a single debounce timer; only when it fires is the
/// size measured, and then only a real change produces new metrics.
#[derive(Debug)]
pub struct ResizeCoordinator {
    quiet_period: Millis,
    pending: Option<(TimerHandle, f32, f32)>,
    last: Option<LayoutMetrics>,
    padding: Padding,
    focus_ratio: f32,
    context_ratio: f32,
}

impl ResizeCoordinator {
    pub fn new(quiet_period: Millis, padding: Padding, focus_ratio: f32, context_ratio: f32) -> Self {
        Self {
            quiet_period,
            pending: None,
            last: None,
            padding,
            focus_ratio,
            context_ratio,
        }
    }

    pub fn current(&self) -> Option<&LayoutMetrics> {
        self.last.as_ref()
    }

    /// Raw resize notification; (re)arms the debounce timer
    pub fn on_resize(&mut self, width: f32, height: f32, timers: &mut TimerQueue, now: Millis) {
        let handle = timers.schedule(TimerKind::ResizeDebounce, now + self.quiet_period);
        trace!(width, height, "Resize debounced");
        self.pending = Some((handle, width, height));
    }

    /// Debounce fired. Returns new metrics only if the size actually changed.
    pub fn on_timer_expired(&mut self, handle: TimerHandle) -> Option<LayoutMetrics> {
        let (pending, width, height) = self.pending?;
        if pending != handle {
            return None;
        }
        self.pending = None;
        self.apply(width, height)
    }

    /// Measure immediately, bypassing the debounce (initial layout)
    pub fn apply(&mut self, width: f32, height: f32) -> Option<LayoutMetrics> {
        if self.last.is_some_and(|l| l.same_size(width, height)) {
            trace!(width, height, "Layout unchanged, skipping recompute");
            return None;
        }
        let metrics =
            LayoutMetrics::measure(width, height, &self.padding, self.focus_ratio, self.context_ratio);
        debug!(width, height, chart_width = metrics.chart_width, "Layout recomputed");
        self.last = Some(metrics);
        Some(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coordinator() -> ResizeCoordinator {
        ResizeCoordinator::new(100, Padding::default(), 0.7, 0.2)
    }

    #[test]
    fn test_measure_subtracts_padding() {
        let m = LayoutMetrics::measure(820.0, 650.0, &Padding::default(), 0.7, 0.2);
        assert_eq!(m.chart_width, 800.0);
        assert_eq!(m.chart_height, 600.0);
        assert!((m.focus_height - 420.0).abs() < 1e-3);
        assert!((m.context_height - 120.0).abs() < 1e-3);
    }

    #[test]
    fn test_burst_collapses_to_last_size() {
        let mut timers = TimerQueue::new();
        let mut rc = coordinator();
        rc.on_resize(400.0, 300.0, &mut timers, 0);
        rc.on_resize(500.0, 300.0, &mut timers, 50);
        rc.on_resize(600.0, 300.0, &mut timers, 90);
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.pop_due(150), None);

        let handle = timers.pop_due(190).unwrap();
        let metrics = rc.on_timer_expired(handle).unwrap();
        assert_eq!(metrics.container_width, 600.0);
    }

    #[test]
    fn test_unchanged_size_is_skipped() {
        let mut timers = TimerQueue::new();
        let mut rc = coordinator();
        assert!(rc.apply(800.0, 600.0).is_some());

        rc.on_resize(800.0, 600.0, &mut timers, 0);
        let handle = timers.pop_due(100).unwrap();
        assert!(rc.on_timer_expired(handle).is_none());
    }

    #[test]
    fn test_stale_handle_ignored() {
        let mut timers = TimerQueue::new();
        let mut rc = coordinator();
        rc.on_resize(400.0, 300.0, &mut timers, 0);
        let early = timers.pop_due(100).unwrap();
        rc.on_resize(500.0, 300.0, &mut timers, 100);
        assert!(rc.on_timer_expired(early).is_none());
    }
}
