//! Single-slot-per-kind timer queue
//!
//! Timers are owned capabilities: scheduling a kind that is already pending
//! replaces it, so there is never more than one outstanding timer per kind.
//! Handles carry a generation number; once a timer fires or is replaced its
//! handle is dead and cancelling it does nothing.

use tracing::trace;

use super::window::Millis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Idle timeout returning a user selection to live mode
    BrushRevert,
    /// Trailing debounce for container resizes
    ResizeDebounce,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    kind: TimerKind,
    generation: u64,
}

impl TimerHandle {
    pub fn kind(&self) -> TimerKind {
        self.kind
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingTimer {
    handle: TimerHandle,
    due: Millis,
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    pending: Vec<PendingTimer>,
    next_generation: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `kind` to fire at `due`, cancelling any pending timer of that kind
    pub fn schedule(&mut self, kind: TimerKind, due: Millis) -> TimerHandle {
        self.pending.retain(|p| p.handle.kind != kind);
        self.next_generation += 1;
        let handle = TimerHandle { kind, generation: self.next_generation };
        self.pending.push(PendingTimer { handle, due });
        trace!(?kind, due, generation = handle.generation, "Timer scheduled");
        handle
    }

    /// Cancel a timer. Returns false if it had already fired or been replaced.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.handle != handle);
        let cancelled = self.pending.len() != before;
        trace!(kind = ?handle.kind, cancelled, "Timer cancel");
        cancelled
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|p| p.handle == handle)
    }

    pub fn due_at(&self, handle: TimerHandle) -> Option<Millis> {
        self.pending.iter().find(|p| p.handle == handle).map(|p| p.due)
    }

    /// Remove and return the earliest timer due at or before `upto`
    pub fn pop_due(&mut self, upto: Millis) -> Option<TimerHandle> {
        let (idx, _) = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due <= upto)
            .min_by_key(|(_, p)| (p.due, p.handle.generation))?;
        Some(self.pending.swap_remove(idx).handle)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_replaces_same_kind() {
        let mut timers = TimerQueue::new();
        let first = timers.schedule(TimerKind::BrushRevert, 100);
        let second = timers.schedule(TimerKind::BrushRevert, 200);
        assert_eq!(timers.len(), 1);
        assert!(!timers.is_pending(first));
        assert!(timers.is_pending(second));
        assert_eq!(timers.pop_due(150), None);
        assert_eq!(timers.pop_due(200), Some(second));
    }

    #[test]
    fn test_kinds_are_independent() {
        let mut timers = TimerQueue::new();
        let revert = timers.schedule(TimerKind::BrushRevert, 300);
        let resize = timers.schedule(TimerKind::ResizeDebounce, 100);
        assert_eq!(timers.len(), 2);
        assert_eq!(timers.pop_due(1_000), Some(resize));
        assert_eq!(timers.pop_due(1_000), Some(revert));
        assert!(timers.is_empty());
    }

    #[test]
    fn test_cancel_before_fire_prevents_it() {
        let mut timers = TimerQueue::new();
        let handle = timers.schedule(TimerKind::BrushRevert, 100);
        assert!(timers.cancel(handle));
        assert_eq!(timers.pop_due(10_000), None);
    }

    #[test]
    fn test_cancel_after_fire_is_noop() {
        let mut timers = TimerQueue::new();
        let handle = timers.schedule(TimerKind::BrushRevert, 100);
        assert_eq!(timers.pop_due(100), Some(handle));
        assert!(!timers.cancel(handle));
        // A later timer of the same kind is not touched by the stale handle
        let next = timers.schedule(TimerKind::BrushRevert, 500);
        assert!(!timers.cancel(handle));
        assert!(timers.is_pending(next));
    }
}
