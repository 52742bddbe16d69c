//! Pixel mappings for the focus and context panes
//!
//! Time axes are linear, value axes logarithmic. Glucose is read on a
//! multiplicative scale, so equal relative change gets equal visual distance.

use super::layout::LayoutMetrics;
use super::window::{Millis, TimeWindow, HOUR_MS, MINUTE_MS};

/// Value domain of the focus pane
pub const FOCUS_VALUE_DOMAIN: (f64, f64) = (30.0, 420.0);
/// Value domain of the context pane
pub const CONTEXT_VALUE_DOMAIN: (f64, f64) = (36.0, 420.0);
/// Clinically meaningful thresholds used as value-axis ticks
pub const VALUE_TICKS: [f64; 7] = [40.0, 60.0, 80.0, 120.0, 180.0, 300.0, 400.0];
/// Approximate number of ticks on the time axes
pub const TIME_TICK_COUNT: usize = 4;

/// Linear time → pixel mapping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    pub domain: TimeWindow,
    pub range: (f32, f32),
}

impl TimeScale {
    pub fn new(domain: TimeWindow, range: (f32, f32)) -> Self {
        Self { domain, range }
    }

    pub fn map(&self, t: Millis) -> f32 {
        let width = self.domain.width();
        if width <= 0 {
            return self.range.0;
        }
        let frac = (t - self.domain.start) as f64 / width as f64;
        self.range.0 + (frac * (self.range.1 - self.range.0) as f64) as f32
    }

    pub fn invert(&self, px: f32) -> Millis {
        let span = (self.range.1 - self.range.0) as f64;
        if span == 0.0 {
            return self.domain.start;
        }
        let frac = (px - self.range.0) as f64 / span;
        self.domain.start + (frac * self.domain.width() as f64).round() as Millis
    }

    /// Calendar-aligned ticks, roughly `count` of them
    pub fn ticks(&self, count: usize) -> Vec<Millis> {
        let step = nice_time_step(self.domain.width(), count);
        let first = self.domain.start.div_euclid(step) * step;
        let first = if first < self.domain.start { first + step } else { first };
        (0..)
            .map(|i| first + i * step)
            .take_while(|&t| t <= self.domain.end)
            .collect()
    }
}

/// Step ladder matching the usual time-axis intervals
const TIME_STEPS: [Millis; 12] = [
    MINUTE_MS,
    5 * MINUTE_MS,
    15 * MINUTE_MS,
    30 * MINUTE_MS,
    HOUR_MS,
    3 * HOUR_MS,
    6 * HOUR_MS,
    12 * HOUR_MS,
    24 * HOUR_MS,
    2 * 24 * HOUR_MS,
    7 * 24 * HOUR_MS,
    30 * 24 * HOUR_MS,
];

fn nice_time_step(width: Millis, count: usize) -> Millis {
    let target = width / count.max(1) as Millis;
    TIME_STEPS
        .iter()
        .copied()
        .min_by_key(|&step| (step - target).abs())
        .unwrap_or(HOUR_MS)
}

/// Logarithmic value → pixel mapping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogScale {
    pub domain: (f64, f64),
    pub range: (f32, f32),
}

impl LogScale {
    pub fn new(domain: (f64, f64), range: (f32, f32)) -> Self {
        Self { domain, range }
    }

    /// Non-positive values map to the domain floor
    pub fn map(&self, v: f64) -> f32 {
        let v = if v > 0.0 { v } else { self.domain.0 };
        let (l0, l1) = (self.domain.0.ln(), self.domain.1.ln());
        let frac = (v.ln() - l0) / (l1 - l0);
        self.range.0 + (frac * (self.range.1 - self.range.0) as f64) as f32
    }
}

/// The four mappings for one layout/domain combination
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scales {
    pub focus_x: TimeScale,
    pub focus_y: LogScale,
    pub context_x: TimeScale,
    pub context_y: LogScale,
}

/// Derives [`Scales`]. Stateless: the same inputs always give the same scales.
pub struct ScaleManager;

impl ScaleManager {
    pub fn recompute(layout: &LayoutMetrics, focus: TimeWindow, context: TimeWindow) -> Scales {
        let width = layout.chart_width;
        Scales {
            focus_x: TimeScale::new(focus, (0.0, width)),
            focus_y: LogScale::new(FOCUS_VALUE_DOMAIN, (layout.focus_height, 0.0)),
            context_x: TimeScale::new(context, (0.0, width)),
            context_y: LogScale::new(
                CONTEXT_VALUE_DOMAIN,
                (layout.chart_height, layout.chart_height - layout.context_height),
            ),
        }
    }
}
