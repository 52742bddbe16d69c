//! Alarm tracking and acknowledgement
//!
//! Sound playback belongs to the front end; this only tracks whether an alarm is
//! active and builds the `ack` frame sent back when the viewer silences it.

use serde_json::json;
use tracing::{debug, info};

use super::events::AlarmKind;
use super::window::{Millis, MINUTE_MS};

/// Snooze choices offered to the viewer, in minutes
pub const SILENCE_OPTIONS_MIN: [i64; 4] = [30, 60, 90, 120];

#[derive(Debug, Default)]
pub struct AlarmState {
    in_progress: bool,
    current: Option<AlarmKind>,
}

impl AlarmState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&mut self, kind: AlarmKind) {
        info!(kind = kind.as_str(), "Alarm raised");
        self.in_progress = true;
        self.current = Some(kind);
    }

    /// Server-side clear. Returns true if an alarm was stopped.
    pub fn clear(&mut self) -> bool {
        if !self.in_progress {
            return false;
        }
        debug!("Clearing alarm");
        self.in_progress = false;
        true
    }

    /// Viewer silenced the alarm. Returns the `ack` frame to send.
    pub fn acknowledge(&mut self, silence: Millis) -> String {
        self.in_progress = false;
        let alarm = self.current.map(AlarmKind::as_str);
        info!(alarm = ?alarm, silence_min = silence / MINUTE_MS, "Alarm acknowledged");
        json!({ "type": "ack", "data": { "alarm": alarm, "silence_ms": silence } }).to_string()
    }

    pub fn is_active(&self) -> bool {
        self.in_progress
    }

    /// Most recent alarm kind, kept after it stops
    pub fn current(&self) -> Option<AlarmKind> {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_clear_only_when_active() {
        let mut alarm = AlarmState::new();
        assert!(!alarm.clear());
        alarm.raise(AlarmKind::Alarm);
        assert!(alarm.is_active());
        assert!(alarm.clear());
        assert!(!alarm.is_active());
        assert!(!alarm.clear());
    }

    #[test]
    fn test_acknowledge_builds_ack_frame() {
        let mut alarm = AlarmState::new();
        alarm.raise(AlarmKind::UrgentAlarm);
        let frame: Value = serde_json::from_str(&alarm.acknowledge(30 * MINUTE_MS)).unwrap();
        assert!(!alarm.is_active());
        assert_eq!(frame["type"], "ack");
        assert_eq!(frame["data"]["alarm"], "urgent_alarm");
        assert_eq!(frame["data"]["silence_ms"], 1_800_000);
    }
}
