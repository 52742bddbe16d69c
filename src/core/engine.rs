//! Viewport synchronization engine
//!
//! Owns the store, the viewport state machine, the timers and the layout, and
//! applies [`EngineEvent`]s strictly in arrival order. Timers that came due
//! before an event arrived fire before that event is applied, so a revert that
//! was due at 12:05 cannot be overtaken by a drag that arrived at 12:06.
//! Only resize notifications coalesce, through the debounce timer.

use std::collections::VecDeque;

use tracing::{debug, trace};

use super::brush::BrushController;
use super::error::DataError;
use super::events::{EngineEvent, FeedBatch};
use super::layout::{LayoutMetrics, ResizeCoordinator};
use super::render::{render_sync, FrameContext, GeometryBatch};
use super::scale::{ScaleManager, Scales};
use super::store::SampleStore;
use super::timers::{TimerKind, TimerQueue};
use super::viewport::{ViewportMode, ViewportState};
use super::window::{Millis, TimeWindow};
use crate::config::DashboardConfig;

pub struct Engine {
    store: SampleStore,
    /// None until the first non-empty delivery
    viewport: Option<ViewportState>,
    brush: BrushController,
    timers: TimerQueue,
    resize: ResizeCoordinator,
    scales: Option<Scales>,
    queue: VecDeque<(Millis, EngineEvent)>,
    server_now: Millis,
    focus_span: Millis,
    idle_timeout: Millis,
    transition_ms: u32,
    dirty: bool,
    frames: u64,
    scale_passes: u64,
}

impl Engine {
    /// `now` seeds the now-marker until the server sends its own clock
    pub fn new(config: &DashboardConfig, now: Millis) -> Self {
        Self {
            store: SampleStore::new(),
            viewport: None,
            brush: BrushController::new(config.focus_span_ms),
            timers: TimerQueue::new(),
            resize: ResizeCoordinator::new(
                config.resize_debounce_ms,
                config.padding,
                config.focus_ratio,
                config.context_ratio,
            ),
            scales: None,
            queue: VecDeque::new(),
            server_now: now,
            focus_span: config.focus_span_ms,
            idle_timeout: config.idle_timeout_ms,
            transition_ms: config.transition_ms,
            dirty: false,
            frames: 0,
            scale_passes: 0,
        }
    }

    /// Queue an event that arrived at `at`
    pub fn push(&mut self, event: EngineEvent, at: Millis) {
        self.queue.push_back((at, event));
    }

    /// Apply all queued events in order, then fire timers due by `now`
    pub fn process(&mut self, now: Millis) {
        while let Some((at, event)) = self.queue.pop_front() {
            self.fire_timers(at);
            self.apply(event, at);
        }
        self.fire_timers(now);
    }

    /// Queue and immediately process a single event
    pub fn handle(&mut self, event: EngineEvent, now: Millis) {
        self.push(event, now);
        self.process(now);
    }

    fn fire_timers(&mut self, upto: Millis) {
        while let Some(handle) = self.timers.pop_due(upto) {
            match handle.kind() {
                TimerKind::BrushRevert => {
                    let range = self.current_range();
                    let Some(viewport) = self.viewport.as_mut() else { continue };
                    if viewport.on_timer_expired(handle, range) {
                        debug!("Idle timeout, returning to live");
                        self.refresh_scales();
                    }
                }
                TimerKind::ResizeDebounce => {
                    if self.resize.on_timer_expired(handle).is_some() {
                        self.refresh_scales();
                    }
                }
            }
        }
    }

    fn apply(&mut self, event: EngineEvent, at: Millis) {
        trace!(?event, at, "Applying event");
        match event {
            EngineEvent::DataArrived(batch) => self.on_data(batch),
            EngineEvent::Now(now) => {
                self.server_now = now;
                self.dirty = true;
            }
            EngineEvent::BrushStart => {
                if let Some(viewport) = self.viewport.as_mut() {
                    viewport.begin_selection(&mut self.timers);
                    self.dirty = true;
                }
            }
            EngineEvent::BrushMove { start, end } => {
                let Ok(range) = self.store.data_range() else {
                    debug!("Brush moved before any data, ignoring");
                    return;
                };
                let Some(viewport) = self.viewport.as_mut() else { return };
                let window = self.brush.on_selection_changed((start, end), range);
                viewport.update_selection(window, &mut self.timers, at);
                self.refresh_scales();
            }
            EngineEvent::BrushEnd => {
                if let Some(viewport) = self.viewport.as_mut() {
                    viewport.end_selection(&mut self.timers, at);
                    self.dirty = true;
                }
            }
            EngineEvent::RevertToLive => {
                let range = self.current_range();
                if let Some(viewport) = self.viewport.as_mut() {
                    viewport.revert_to_live(&mut self.timers, range);
                    self.refresh_scales();
                }
            }
            EngineEvent::Resize { width, height } => {
                if self.resize.current().is_none() {
                    // First measurement is taken immediately
                    if self.resize.apply(width, height).is_some() {
                        self.refresh_scales();
                    }
                } else {
                    self.resize.on_resize(width, height, &mut self.timers, at);
                }
            }
        }
    }

    fn on_data(&mut self, batch: FeedBatch) {
        self.store.replace(batch.samples, batch.treatments);
        let range = match self.store.data_range() {
            Ok(range) => range,
            Err(DataError::EmptyDataset) => {
                debug!("Empty delivery, nothing to draw");
                self.dirty = false;
                return;
            }
        };

        let brush = self.brush;
        match self.viewport.as_mut() {
            Some(viewport) => viewport.on_data(range, |stale| {
                brush.on_selection_changed((stale.start, stale.end), range)
            }),
            None => {
                self.viewport = Some(ViewportState::new(range, self.focus_span, self.idle_timeout));
            }
        }
        self.refresh_scales();
    }

    /// Data range for reverting to live. An empty store keeps the current window.
    fn current_range(&self) -> (Millis, Millis) {
        match (self.store.data_range(), self.viewport.as_ref()) {
            (Ok(range), _) => range,
            (Err(_), Some(vp)) => (vp.focus_window().start, vp.focus_window().end),
            (Err(_), None) => (self.server_now, self.server_now),
        }
    }

    fn refresh_scales(&mut self) {
        self.dirty = true;
        let (Some(layout), Some(viewport), Ok(context)) =
            (self.resize.current(), self.viewport.as_ref(), self.store.context_domain())
        else {
            return;
        };
        self.scales = Some(ScaleManager::recompute(layout, viewport.focus_window(), context));
        self.scale_passes += 1;
        trace!(passes = self.scale_passes, "Scales recomputed");
    }

    /// Geometry for the current state, or None while there is nothing to draw
    pub fn geometry(&self) -> Option<GeometryBatch> {
        let (Some(viewport), Some(scales), Some(layout)) =
            (self.viewport.as_ref(), self.scales.as_ref(), self.resize.current())
        else {
            return None;
        };
        if self.store.is_empty() {
            return None;
        }
        let transition_ms = if self.frames == 0 { 0 } else { self.transition_ms };
        Some(render_sync(
            &self.store,
            viewport,
            scales,
            layout,
            FrameContext { now: self.server_now, transition_ms },
        ))
    }

    /// Geometry only if something changed since the last call
    pub fn take_frame(&mut self) -> Option<GeometryBatch> {
        if !self.dirty {
            return None;
        }
        let batch = self.geometry()?;
        self.dirty = false;
        self.frames += 1;
        Some(batch)
    }

    pub fn mode(&self) -> Option<ViewportMode> {
        self.viewport.as_ref().map(ViewportState::mode)
    }

    pub fn focus_window(&self) -> Option<TimeWindow> {
        self.viewport.as_ref().map(ViewportState::focus_window)
    }

    /// When the pending revert will fire, if one is armed
    pub fn revert_due(&self) -> Option<Millis> {
        let handle = self.viewport.as_ref()?.pending_revert()?;
        self.timers.due_at(handle)
    }

    pub fn store(&self) -> &SampleStore {
        &self.store
    }

    pub fn layout(&self) -> Option<&LayoutMetrics> {
        self.resize.current()
    }

    pub fn scales(&self) -> Option<&Scales> {
        self.scales.as_ref()
    }

    /// Number of scale recomputations so far
    pub fn scale_passes(&self) -> u64 {
        self.scale_passes
    }

    pub fn server_now(&self) -> Millis {
        self.server_now
    }

    pub fn is_initialized(&self) -> bool {
        self.viewport.is_some()
    }

    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::{Sample, SeriesTag};
    use crate::core::window::{FOCUS_SPAN, HOUR_MS, MINUTE_MS};

    fn batch(from: Millis, to: Millis) -> FeedBatch {
        let samples = (from..=to)
            .step_by(5 * MINUTE_MS as usize)
            .map(|t| Sample { timestamp: t, value: 120.0, tag: SeriesTag::Raw })
            .collect();
        FeedBatch { samples, treatments: vec![] }
    }

    fn engine() -> Engine {
        let mut e = Engine::new(&DashboardConfig::default(), 0);
        e.handle(EngineEvent::Resize { width: 820.0, height: 650.0 }, 0);
        e
    }

    #[test]
    fn test_no_geometry_before_data() {
        let mut e = engine();
        assert!(!e.is_initialized());
        assert!(e.geometry().is_none());
        assert!(e.take_frame().is_none());

        // Drags before data are ignored
        e.handle(EngineEvent::BrushStart, 0);
        e.handle(EngineEvent::BrushMove { start: 0, end: FOCUS_SPAN }, 0);
        assert_eq!(e.mode(), None);
    }

    #[test]
    fn test_first_frame_has_no_transition() {
        let mut e = engine();
        e.handle(EngineEvent::DataArrived(batch(0, 4 * HOUR_MS)), 0);
        let first = e.take_frame().unwrap();
        assert_eq!(first.transition_ms, 0);
        assert!(e.take_frame().is_none());

        e.handle(EngineEvent::DataArrived(batch(0, 5 * HOUR_MS)), 1_000);
        assert_eq!(e.take_frame().unwrap().transition_ms, 750);
    }

    #[test]
    fn test_empty_delivery_skips_render() {
        let mut e = engine();
        e.handle(EngineEvent::DataArrived(batch(0, 4 * HOUR_MS)), 0);
        e.handle(EngineEvent::DataArrived(FeedBatch::default()), 1_000);
        assert!(e.geometry().is_none());
        assert!(e.take_frame().is_none());
        // Viewport survives for the next real delivery
        assert_eq!(e.mode(), Some(ViewportMode::Live));
    }

    #[test]
    fn test_timer_due_before_event_fires_first() {
        let mut e = engine();
        e.handle(EngineEvent::DataArrived(batch(0, 10 * HOUR_MS)), 0);
        e.handle(EngineEvent::BrushStart, 0);
        e.handle(EngineEvent::BrushMove { start: 0, end: FOCUS_SPAN }, 0);
        let due = e.revert_due().unwrap();

        // Data arrives after the revert was due but is processed later
        e.push(EngineEvent::DataArrived(batch(0, 11 * HOUR_MS)), due + 1);
        e.process(due + 2);

        // Revert happened first, then live mode followed the new data
        assert_eq!(e.mode(), Some(ViewportMode::Live));
        assert_eq!(e.focus_window().unwrap().end, 11 * HOUR_MS);
    }

    #[test]
    fn test_events_apply_in_arrival_order() {
        let mut e = engine();
        e.handle(EngineEvent::DataArrived(batch(0, 10 * HOUR_MS)), 0);

        e.push(EngineEvent::BrushStart, 10);
        e.push(EngineEvent::BrushMove { start: HOUR_MS, end: HOUR_MS + FOCUS_SPAN }, 20);
        e.push(EngineEvent::DataArrived(batch(0, 12 * HOUR_MS)), 30);
        assert_eq!(e.pending_events(), 3);
        e.process(40);

        // The selection was made first, so the new data does not move it
        assert_eq!(e.mode(), Some(ViewportMode::UserSelecting));
        assert_eq!(e.focus_window(), Some(TimeWindow::new(HOUR_MS, HOUR_MS + FOCUS_SPAN)));
        assert_eq!(e.pending_events(), 0);
    }

    #[test]
    fn test_stale_selection_recomputed_against_new_data() {
        let mut e = engine();
        e.handle(EngineEvent::DataArrived(batch(0, 10 * HOUR_MS)), 0);
        e.handle(EngineEvent::BrushStart, 0);
        e.handle(EngineEvent::BrushMove { start: 0, end: FOCUS_SPAN }, 0);

        // History moved on past the chosen window
        e.handle(EngineEvent::DataArrived(batch(5 * HOUR_MS, 15 * HOUR_MS)), 1_000);
        let w = e.focus_window().unwrap();
        assert!(w.intersects(5 * HOUR_MS, 15 * HOUR_MS));
        assert_eq!(w.width(), FOCUS_SPAN);
        assert_eq!(e.mode(), Some(ViewportMode::UserSelecting));
    }

    #[test]
    fn test_revert_to_live_clears_timer() {
        let mut e = engine();
        e.handle(EngineEvent::DataArrived(batch(0, 10 * HOUR_MS)), 0);
        e.handle(EngineEvent::BrushStart, 0);
        e.handle(EngineEvent::BrushMove { start: 0, end: FOCUS_SPAN }, 0);
        assert!(e.revert_due().is_some());

        e.handle(EngineEvent::RevertToLive, 1_000);
        assert_eq!(e.mode(), Some(ViewportMode::Live));
        assert_eq!(e.revert_due(), None);
        assert_eq!(e.focus_window().unwrap().end, 10 * HOUR_MS);
    }

    #[test]
    fn test_press_and_release_without_move_expires() {
        let mut e = engine();
        e.handle(EngineEvent::DataArrived(batch(0, 4 * HOUR_MS)), 0);
        e.handle(EngineEvent::BrushStart, 1_000);
        e.handle(EngineEvent::BrushEnd, 1_000);
        assert_eq!(e.revert_due(), Some(1_000 + 5 * MINUTE_MS));

        e.handle(EngineEvent::DataArrived(batch(0, 6 * HOUR_MS)), 2_000);
        e.process(1_000 + 5 * MINUTE_MS);
        assert_eq!(e.mode(), Some(ViewportMode::Live));
        assert_eq!(e.focus_window().unwrap().end, 6 * HOUR_MS);
    }

    #[test]
    fn test_geometry_reflects_brush_immediately() {
        let mut e = engine();
        e.handle(EngineEvent::DataArrived(batch(0, 10 * HOUR_MS)), 0);
        e.push(EngineEvent::BrushStart, 0);
        e.push(EngineEvent::BrushMove { start: HOUR_MS, end: 2 * HOUR_MS }, 0);
        e.process(0);

        let brush = e.geometry().unwrap().brush;
        assert_eq!(brush.window, TimeWindow::new(HOUR_MS, HOUR_MS + FOCUS_SPAN));
        assert_eq!(Some(brush.window), e.focus_window());
    }

    #[test]
    fn test_now_moves_marker() {
        let mut e = engine();
        e.handle(EngineEvent::DataArrived(batch(0, 4 * HOUR_MS)), 0);
        e.take_frame();
        e.handle(EngineEvent::Now(4 * HOUR_MS), 10);
        let frame = e.take_frame().unwrap();
        assert_eq!(e.server_now(), 4 * HOUR_MS);
        let now_line = frame
            .lines
            .iter()
            .find(|l| l.kind == crate::core::render::RefLineKind::FocusNow)
            .unwrap();
        assert!((now_line.from.0 - frame.layout.chart_width).abs() < 1e-3);
    }
}
