//! Sample and treatment storage
//!
//! The feed always delivers a full recent window, so the store is a
//! whole-buffer replace with no append or remove. Samples are expected sorted by
//! timestamp within each series; an unsorted feed still produces a valid extent
//! (min/max are scanned) but point order is whatever the feed sent.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::error::DataError;
use super::window::{Millis, TimeWindow};

/// Which feed series a sample came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeriesTag {
    Raw,
    Smoothed,
    Predicted,
}

impl SeriesTag {
    pub const ALL: [SeriesTag; 3] = [SeriesTag::Raw, SeriesTag::Smoothed, SeriesTag::Predicted];
}

/// A single glucose reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: Millis,
    pub value: f64,
    pub tag: SeriesTag,
}

/// Carbs/insulin annotation drawn as a bubble in the focus pane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Treatment {
    #[serde(rename = "x")]
    pub timestamp: Millis,
    /// Glucose value the bubble is anchored at
    #[serde(rename = "y")]
    pub display_value: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub insulin: f64,
    #[serde(rename = "CR")]
    pub carb_ratio: f64,
}

/// Most recent delivery of samples and treatments
#[derive(Debug, Default)]
pub struct SampleStore {
    samples: Vec<Sample>,
    treatments: Vec<Treatment>,
    /// Cached [min, max] timestamp, None while empty
    range: Option<(Millis, Millis)>,
}

impl SampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a new delivery, discarding the previous one
    pub fn replace(&mut self, samples: Vec<Sample>, treatments: Vec<Treatment>) {
        let range = samples.iter().fold(None, |acc: Option<(Millis, Millis)>, s| {
            Some(match acc {
                None => (s.timestamp, s.timestamp),
                Some((lo, hi)) => (lo.min(s.timestamp), hi.max(s.timestamp)),
            })
        });

        debug!(
            samples = samples.len(),
            treatments = treatments.len(),
            range = ?range,
            "Sample store replaced"
        );

        self.samples = samples;
        self.treatments = treatments;
        self.range = range;
    }

    /// `[min, max]` timestamp of the held samples
    ///
    /// A single-instant history yields `min == max`.
    pub fn data_range(&self) -> Result<(Millis, Millis), DataError> {
        self.range.ok_or(DataError::EmptyDataset)
    }

    /// Context-pane domain. Same as `data_range`, widened by one millisecond when
    /// the history is a single instant so the window invariant holds.
    pub fn context_domain(&self) -> Result<TimeWindow, DataError> {
        let (lo, hi) = self.data_range()?;
        Ok(TimeWindow::new(lo, hi.max(lo + 1)))
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn treatments(&self) -> &[Treatment] {
        &self.treatments
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Last raw reading, used for the current-value display
    pub fn latest_raw(&self) -> Option<&Sample> {
        let latest = self.samples.iter().rev().find(|s| s.tag == SeriesTag::Raw);
        trace!(latest = ?latest.map(|s| s.value), "Latest raw lookup");
        latest
    }
}
