//! Feed frame parser
//!
//! Frames are JSON text with a `{"type": ..., "data": ...}` envelope. The `sgv`
//! frame carries `[raw, smoothed, predicted, treatments]`; the three sample
//! series are merged into one tagged list.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace, warn};

use super::error::FeedError;
use super::events::{AlarmKind, FeedBatch, FeedMessage};
use super::store::{Sample, SeriesTag, Treatment};
use super::window::Millis;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct WirePoint {
    x: Millis,
    y: f64,
}

/// Parse a feed frame. Undecodable frames are logged and dropped.
pub fn parse_feed(msg: &str) -> Option<FeedMessage> {
    trace!(len = msg.len(), "Parsing feed frame");
    decode(msg)
        .map_err(|e| {
            warn!(error = %e, "Dropping feed frame");
        })
        .ok()
        .flatten()
}

/// Decode a frame; `Ok(None)` for well-formed frames this client ignores
pub fn decode(msg: &str) -> Result<Option<FeedMessage>, FeedError> {
    let envelope: Envelope = serde_json::from_str(msg)?;

    let message = match envelope.kind.as_str() {
        "sgv" => decode_batch(envelope.data)?.map(FeedMessage::Batch),
        "now" => {
            let now = envelope.data.as_i64().ok_or(FeedError::Shape("now must be epoch millis"))?;
            Some(FeedMessage::Now(now))
        }
        "alarm" => Some(FeedMessage::Alarm(AlarmKind::Alarm)),
        "urgent_alarm" => Some(FeedMessage::Alarm(AlarmKind::UrgentAlarm)),
        "clear_alarm" => Some(FeedMessage::ClearAlarm),
        "clients" => {
            let watchers = envelope
                .data
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or(FeedError::Shape("clients must be a count"))?;
            Some(FeedMessage::Clients(watchers))
        }
        other => {
            debug!(kind = other, "Ignoring feed frame");
            None
        }
    };
    Ok(message)
}

fn decode_batch(data: Value) -> Result<Option<FeedBatch>, FeedError> {
    let Value::Array(mut parts) = data else {
        return Err(FeedError::Shape("sgv payload must be an array"));
    };
    // A lone series is not a full delivery
    if parts.len() < 2 {
        return Ok(None);
    }
    parts.resize(4, Value::Array(Vec::new()));

    let mut samples = Vec::new();
    for (part, tag) in parts.iter_mut().zip(SeriesTag::ALL) {
        let points: Vec<WirePoint> = serde_json::from_value(part.take())?;
        samples.extend(points.into_iter().map(|p| Sample { timestamp: p.x, value: p.y, tag }));
    }
    let treatments: Vec<Treatment> = serde_json::from_value(parts[3].take())?;

    debug!(samples = samples.len(), treatments = treatments.len(), "sgv batch decoded");
    Ok(Some(FeedBatch { samples, treatments }))
}
