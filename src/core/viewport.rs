//! Focus-window state machine
//!
//! Two modes: `Live` follows the latest sample, `UserSelecting` holds the window
//! the viewer scrubbed to until an idle timeout (or an explicit "jump to now")
//! returns it to live. The transition methods below are the only mutators.

use tracing::debug;

use super::timers::{TimerHandle, TimerKind, TimerQueue};
use super::window::{follow_latest, Millis, TimeWindow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportMode {
    Live,
    UserSelecting,
}

/// Owned by the engine; read freely by rendering
#[derive(Debug)]
pub struct ViewportState {
    mode: ViewportMode,
    focus_window: TimeWindow,
    pending_revert: Option<TimerHandle>,
    span: Millis,
    idle_timeout: Millis,
}

impl ViewportState {
    /// Initial state once the first data has arrived
    pub fn new(data_range: (Millis, Millis), span: Millis, idle_timeout: Millis) -> Self {
        let focus_window = follow_latest(data_range, span);
        debug!(start = focus_window.start, end = focus_window.end, "Viewport initialized");
        Self {
            mode: ViewportMode::Live,
            focus_window,
            pending_revert: None,
            span,
            idle_timeout,
        }
    }

    pub fn mode(&self) -> ViewportMode {
        self.mode
    }

    pub fn focus_window(&self) -> TimeWindow {
        self.focus_window
    }

    pub fn pending_revert(&self) -> Option<TimerHandle> {
        self.pending_revert
    }

    pub fn is_live(&self) -> bool {
        self.mode == ViewportMode::Live
    }

    /// New delivery. Live follows the new latest sample; a user selection is
    /// preserved unless the data no longer overlaps it, in which case
    /// `reclamp` re-derives it against the new extent.
    pub fn on_data(
        &mut self,
        data_range: (Millis, Millis),
        reclamp: impl FnOnce(TimeWindow) -> TimeWindow,
    ) {
        match self.mode {
            ViewportMode::Live => {
                self.focus_window = follow_latest(data_range, self.span);
            }
            ViewportMode::UserSelecting => {
                if !self.focus_window.intersects(data_range.0, data_range.1) {
                    let stale = self.focus_window;
                    self.focus_window = reclamp(stale);
                    debug!(
                        stale_start = stale.start,
                        stale_end = stale.end,
                        start = self.focus_window.start,
                        end = self.focus_window.end,
                        "Stale selection re-clamped"
                    );
                }
            }
        }
    }

    /// Drag started on the brush
    pub fn begin_selection(&mut self, timers: &mut TimerQueue) {
        if let Some(handle) = self.pending_revert.take() {
            timers.cancel(handle);
        }
        if self.mode == ViewportMode::Live {
            debug!("Viewport Live -> UserSelecting");
            self.mode = ViewportMode::UserSelecting;
        }
    }

    /// Drag moved; `window` is the already-corrected extent
    pub fn update_selection(&mut self, window: TimeWindow, timers: &mut TimerQueue, now: Millis) {
        if self.mode == ViewportMode::Live {
            debug!("Viewport Live -> UserSelecting (update without start)");
            self.mode = ViewportMode::UserSelecting;
        }
        self.focus_window = window;
        // schedule() replaces any previous revert timer
        self.pending_revert = Some(timers.schedule(TimerKind::BrushRevert, now + self.idle_timeout));
    }

    /// Drag released. The revert timer from the last update stays armed; a drag
    /// that never moved arms one here so a selection always expires.
    pub fn end_selection(&mut self, timers: &mut TimerQueue, now: Millis) {
        if self.mode == ViewportMode::UserSelecting && self.pending_revert.is_none() {
            debug!("Selection ended without a move, arming revert");
            self.pending_revert = Some(timers.schedule(TimerKind::BrushRevert, now + self.idle_timeout));
        }
    }

    /// A revert timer fired. Handles from replaced timers are ignored.
    pub fn on_timer_expired(&mut self, handle: TimerHandle, data_range: (Millis, Millis)) -> bool {
        if self.pending_revert != Some(handle) {
            return false;
        }
        self.pending_revert = None;
        self.go_live(data_range);
        true
    }

    /// Programmatic "jump to now"
    pub fn revert_to_live(&mut self, timers: &mut TimerQueue, data_range: (Millis, Millis)) {
        if let Some(handle) = self.pending_revert.take() {
            timers.cancel(handle);
        }
        self.go_live(data_range);
    }

    fn go_live(&mut self, data_range: (Millis, Millis)) {
        if self.mode != ViewportMode::Live {
            debug!("Viewport UserSelecting -> Live");
        }
        self.mode = ViewportMode::Live;
        self.focus_window = follow_latest(data_range, self.span);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::window::{FOCUS_SPAN, HOUR_MS, MINUTE_MS};

    const IDLE: Millis = 5 * MINUTE_MS;

    fn keep(w: TimeWindow) -> TimeWindow {
        w
    }

    #[test]
    fn test_initial_state_is_live_on_latest() {
        let vp = ViewportState::new((0, 4 * HOUR_MS), FOCUS_SPAN, IDLE);
        assert!(vp.is_live());
        assert_eq!(vp.focus_window(), TimeWindow::new(HOUR_MS / 2, 4 * HOUR_MS));
        assert_eq!(vp.pending_revert(), None);
    }

    #[test]
    fn test_live_follows_new_data() {
        let mut vp = ViewportState::new((0, 4 * HOUR_MS), FOCUS_SPAN, IDLE);
        vp.on_data((0, 5 * HOUR_MS), keep);
        assert_eq!(vp.focus_window().end, 5 * HOUR_MS);
        assert_eq!(vp.focus_window().width(), FOCUS_SPAN);
    }

    #[test]
    fn test_selection_survives_new_data() {
        let mut timers = TimerQueue::new();
        let mut vp = ViewportState::new((0, 4 * HOUR_MS), FOCUS_SPAN, IDLE);
        let chosen = TimeWindow::new(0, FOCUS_SPAN);

        vp.begin_selection(&mut timers);
        vp.update_selection(chosen, &mut timers, 1_000);
        vp.on_data((0, 5 * HOUR_MS), keep);

        assert_eq!(vp.mode(), ViewportMode::UserSelecting);
        assert_eq!(vp.focus_window(), chosen);
    }

    #[test]
    fn test_update_reschedules_single_timer() {
        let mut timers = TimerQueue::new();
        let mut vp = ViewportState::new((0, 4 * HOUR_MS), FOCUS_SPAN, IDLE);
        vp.begin_selection(&mut timers);
        vp.update_selection(TimeWindow::new(0, FOCUS_SPAN), &mut timers, 1_000);
        let first = vp.pending_revert().unwrap();
        vp.update_selection(TimeWindow::new(1, FOCUS_SPAN + 1), &mut timers, 2_000);
        let second = vp.pending_revert().unwrap();

        assert_ne!(first, second);
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.due_at(second), Some(2_000 + IDLE));

        // Stale handle must not revert
        assert!(!vp.on_timer_expired(first, (0, 4 * HOUR_MS)));
        assert_eq!(vp.mode(), ViewportMode::UserSelecting);
    }

    #[test]
    fn test_end_selection_keeps_timer() {
        let mut timers = TimerQueue::new();
        let mut vp = ViewportState::new((0, 4 * HOUR_MS), FOCUS_SPAN, IDLE);
        vp.begin_selection(&mut timers);
        vp.update_selection(TimeWindow::new(0, FOCUS_SPAN), &mut timers, 0);
        let armed = vp.pending_revert().unwrap();
        vp.end_selection(&mut timers, 60_000);
        assert_eq!(vp.mode(), ViewportMode::UserSelecting);
        assert_eq!(vp.pending_revert(), Some(armed));
        assert_eq!(timers.due_at(armed), Some(IDLE));
    }

    #[test]
    fn test_click_without_move_still_expires() {
        let mut timers = TimerQueue::new();
        let mut vp = ViewportState::new((0, 4 * HOUR_MS), FOCUS_SPAN, IDLE);
        vp.begin_selection(&mut timers);
        vp.end_selection(&mut timers, 1_000);
        assert_eq!(vp.mode(), ViewportMode::UserSelecting);

        let handle = timers.pop_due(1_000 + IDLE).unwrap();
        assert!(vp.on_timer_expired(handle, (0, 6 * HOUR_MS)));
        assert!(vp.is_live());
        assert_eq!(vp.focus_window().end, 6 * HOUR_MS);
    }

    #[test]
    fn test_second_press_without_move_rearms_revert() {
        let mut timers = TimerQueue::new();
        let mut vp = ViewportState::new((0, 4 * HOUR_MS), FOCUS_SPAN, IDLE);
        vp.begin_selection(&mut timers);
        vp.update_selection(TimeWindow::new(0, FOCUS_SPAN), &mut timers, 0);
        vp.end_selection(&mut timers, 0);

        // Pressing again cancels the old timer; releasing must arm a new one
        vp.begin_selection(&mut timers);
        assert_eq!(vp.pending_revert(), None);
        vp.end_selection(&mut timers, MINUTE_MS);
        assert_eq!(timers.due_at(vp.pending_revert().unwrap()), Some(MINUTE_MS + IDLE));
    }

    #[test]
    fn test_expiry_returns_to_live_with_current_data() {
        let mut timers = TimerQueue::new();
        let mut vp = ViewportState::new((0, 4 * HOUR_MS), FOCUS_SPAN, IDLE);
        vp.begin_selection(&mut timers);
        vp.update_selection(TimeWindow::new(0, FOCUS_SPAN), &mut timers, 0);
        let handle = timers.pop_due(IDLE).unwrap();

        assert!(vp.on_timer_expired(handle, (0, 6 * HOUR_MS)));
        assert!(vp.is_live());
        assert_eq!(vp.pending_revert(), None);
        assert_eq!(vp.focus_window(), TimeWindow::new(6 * HOUR_MS - FOCUS_SPAN, 6 * HOUR_MS));
    }

    #[test]
    fn test_revert_to_live_cancels_timer() {
        let mut timers = TimerQueue::new();
        let mut vp = ViewportState::new((0, 4 * HOUR_MS), FOCUS_SPAN, IDLE);
        vp.begin_selection(&mut timers);
        vp.update_selection(TimeWindow::new(0, FOCUS_SPAN), &mut timers, 0);

        vp.revert_to_live(&mut timers, (0, 4 * HOUR_MS));
        assert!(vp.is_live());
        assert!(timers.is_empty());
        assert_eq!(timers.pop_due(Millis::MAX), None);
    }

    #[test]
    fn test_disjoint_selection_is_reclamped() {
        let mut timers = TimerQueue::new();
        let mut vp = ViewportState::new((0, 10 * HOUR_MS), FOCUS_SPAN, IDLE);
        vp.begin_selection(&mut timers);
        vp.update_selection(TimeWindow::new(0, FOCUS_SPAN), &mut timers, 0);

        let new_range = (8 * HOUR_MS, 14 * HOUR_MS);
        vp.on_data(new_range, |_| TimeWindow::new(8 * HOUR_MS, 8 * HOUR_MS + FOCUS_SPAN));
        assert_eq!(vp.mode(), ViewportMode::UserSelecting);
        assert_eq!(vp.focus_window().start, 8 * HOUR_MS);
    }
}
