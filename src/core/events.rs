//! Inputs to the engine and feed message types

use super::store::{Sample, Treatment};
use super::window::Millis;

/// One full delivery from the feed, already merged into tagged samples
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedBatch {
    pub samples: Vec<Sample>,
    pub treatments: Vec<Treatment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmKind {
    Alarm,
    UrgentAlarm,
}

impl AlarmKind {
    /// Name used on the wire
    pub fn as_str(self) -> &'static str {
        match self {
            AlarmKind::Alarm => "alarm",
            AlarmKind::UrgentAlarm => "urgent_alarm",
        }
    }
}

/// A decoded feed frame
#[derive(Debug, Clone, PartialEq)]
pub enum FeedMessage {
    Batch(FeedBatch),
    Now(Millis),
    Alarm(AlarmKind),
    ClearAlarm,
    Clients(u32),
}

/// Everything that can change what the dashboard shows
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    DataArrived(FeedBatch),
    /// Server clock for the now-marker
    Now(Millis),
    BrushStart,
    /// Raw, uncorrected selection extent
    BrushMove { start: Millis, end: Millis },
    BrushEnd,
    /// "Jump to now"
    RevertToLive,
    /// Container measured at a new size
    Resize { width: f32, height: f32 },
}
