//! Geometry computation for both panes
//!
//! [`render_sync`] is a pure function of the store, the viewport and the scales.
//! It produces everything the drawing layer needs, recomputed wholesale per call;
//! the drawing layer never looks at the store or the viewport itself.

use chrono::{Local, TimeZone, Timelike};
use tracing::trace;

use super::bubble::{bubble_arcs, label_font_size, ArcSegment, BubbleRadii, BubbleTier};
use super::layout::LayoutMetrics;
use super::scale::{Scales, TimeScale, TIME_TICK_COUNT, VALUE_TICKS};
use super::store::{SampleStore, SeriesTag};
use super::viewport::{ViewportMode, ViewportState};
use super::window::{Millis, TimeWindow};

pub const FOCUS_POINT_RADIUS: f32 = 3.0;
pub const CONTEXT_POINT_RADIUS: f32 = 2.0;
/// Context points outside the focus window are faded to this
pub const UNSELECTED_OPACITY: f32 = 0.2;
pub const HIGH_THRESHOLD: f64 = 180.0;
pub const LOW_THRESHOLD: f64 = 80.0;
pub const DAY_OPACITY: f32 = 1.0;
pub const NIGHT_OPACITY: f32 = 0.5;

/// A sample positioned in one pane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointGeometry {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub tag: SeriesTag,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreatmentGlyph {
    /// Focus-pane position of the bubble centre
    pub anchor: (f32, f32),
    pub radii: BubbleRadii,
    pub arcs: Vec<ArcSegment>,
    pub font_size: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefLineKind {
    FocusNow,
    FocusHigh,
    FocusLow,
    ContextNow,
    ContextHigh,
    ContextLow,
    /// Joins the brush edges across the top of the context pane
    OpenTop,
    OpenLeft,
    OpenRight,
}

impl RefLineKind {
    pub fn is_dashed(self) -> bool {
        !matches!(self, RefLineKind::OpenTop | RefLineKind::OpenLeft | RefLineKind::OpenRight)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefLine {
    pub kind: RefLineKind,
    pub from: (f32, f32),
    pub to: (f32, f32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    /// Pixel position along the axis
    pub pos: f32,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    /// x for vertical axes, y for horizontal ones
    pub baseline: f32,
    pub ticks: Vec<Tick>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Axes {
    pub focus_time: Axis,
    pub focus_value: Axis,
    pub context_time: Axis,
}

/// Brush rectangle in the context pane, from the corrected window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushGeometry {
    pub window: TimeWindow,
    pub x0: f32,
    pub x1: f32,
    pub y0: f32,
    pub y1: f32,
}

/// One frame of geometry
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryBatch {
    pub layout: LayoutMetrics,
    pub mode: ViewportMode,
    pub focus_points: Vec<PointGeometry>,
    pub context_points: Vec<PointGeometry>,
    pub treatments: Vec<TreatmentGlyph>,
    pub lines: Vec<RefLine>,
    pub axes: Axes,
    pub brush: BrushGeometry,
    /// Focus pane clip rectangle: (0, 0) to (width, height)
    pub clip: (f32, f32),
    /// Transition duration for animated adapters; 0 on the first frame
    pub transition_ms: u32,
    pub body_opacity: f32,
}

/// Inputs that are not part of the viewport or the store
#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    /// Server-reported current time
    pub now: Millis,
    pub transition_ms: u32,
}

pub fn render_sync(
    store: &SampleStore,
    viewport: &ViewportState,
    scales: &Scales,
    layout: &LayoutMetrics,
    frame: FrameContext,
) -> GeometryBatch {
    let window = viewport.focus_window();

    let focus_points = store
        .samples()
        .iter()
        .map(|s| PointGeometry {
            x: scales.focus_x.map(s.timestamp),
            y: scales.focus_y.map(s.value),
            radius: FOCUS_POINT_RADIUS,
            tag: s.tag,
            opacity: 1.0,
        })
        .collect();

    let context_points = store
        .samples()
        .iter()
        .map(|s| PointGeometry {
            x: scales.context_x.map(s.timestamp),
            y: scales.context_y.map(s.value),
            radius: CONTEXT_POINT_RADIUS,
            tag: s.tag,
            opacity: point_opacity(window, s.timestamp),
        })
        .collect();

    let tier = BubbleTier::for_width(layout.chart_width);
    let treatments = store
        .treatments()
        .iter()
        .map(|t| TreatmentGlyph {
            anchor: (scales.focus_x.map(t.timestamp), scales.focus_y.map(t.display_value)),
            radii: BubbleRadii::new(t, tier),
            arcs: bubble_arcs(t, tier),
            font_size: label_font_size(tier),
        })
        .collect();

    let lines = reference_lines(scales, layout, window, frame.now);
    let axes = build_axes(scales, layout);

    let brush = BrushGeometry {
        window,
        x0: scales.context_x.map(window.start),
        x1: scales.context_x.map(window.end),
        y0: layout.focus_height,
        y1: layout.chart_height,
    };

    trace!(
        points = store.samples().len(),
        treatments = store.treatments().len(),
        "Geometry batch computed"
    );

    GeometryBatch {
        layout: *layout,
        mode: viewport.mode(),
        focus_points,
        context_points,
        treatments,
        lines,
        axes,
        brush,
        clip: (layout.chart_width, layout.chart_height),
        transition_ms: frame.transition_ms,
        body_opacity: body_opacity(frame.now),
    }
}

/// Context-pane emphasis of the selected slice
pub fn point_opacity(window: TimeWindow, t: Millis) -> f32 {
    if window.contains(t) {
        1.0
    } else {
        UNSELECTED_OPACITY
    }
}

fn reference_lines(scales: &Scales, layout: &LayoutMetrics, window: TimeWindow, now: Millis) -> Vec<RefLine> {
    let (fx, fy, cx, cy) = (&scales.focus_x, &scales.focus_y, &scales.context_x, &scales.context_y);
    let context = scales.context_x.domain;
    let hline = |kind, x0: f32, x1: f32, y: f32| RefLine { kind, from: (x0, y), to: (x1, y) };
    let vline = |kind, x: f32, y0: f32, y1: f32| RefLine { kind, from: (x, y0), to: (x, y1) };

    vec![
        vline(RefLineKind::FocusNow, fx.map(now), fy.map(36.0), fy.map(420.0)),
        hline(RefLineKind::FocusHigh, fx.map(window.start), fx.map(window.end), fy.map(HIGH_THRESHOLD)),
        hline(RefLineKind::FocusLow, fx.map(window.start), fx.map(window.end), fy.map(LOW_THRESHOLD)),
        vline(RefLineKind::ContextNow, cx.map(now), cy.map(36.0), cy.map(420.0)),
        hline(RefLineKind::ContextHigh, cx.map(context.start), cx.map(context.end), cy.map(HIGH_THRESHOLD)),
        hline(RefLineKind::ContextLow, cx.map(context.start), cx.map(context.end), cy.map(LOW_THRESHOLD)),
        hline(RefLineKind::OpenTop, cx.map(window.start), cx.map(window.end), fy.map(30.0)),
        vline(RefLineKind::OpenLeft, cx.map(window.start), layout.focus_height, layout.chart_height),
        vline(RefLineKind::OpenRight, cx.map(window.end), layout.focus_height, layout.chart_height),
    ]
}

fn build_axes(scales: &Scales, layout: &LayoutMetrics) -> Axes {
    let time_axis = |scale: &TimeScale, baseline| Axis {
        baseline,
        ticks: scale
            .ticks(TIME_TICK_COUNT)
            .into_iter()
            .map(|t| Tick { pos: scale.map(t), label: time_label(t) })
            .collect(),
    };

    Axes {
        focus_time: time_axis(&scales.focus_x, layout.focus_height),
        focus_value: Axis {
            baseline: layout.chart_width,
            ticks: VALUE_TICKS
                .iter()
                .map(|&v| Tick { pos: scales.focus_y.map(v), label: format!("{}", v as i64) })
                .collect(),
        },
        context_time: time_axis(&scales.context_x, layout.chart_height),
    }
}

fn time_label(t: Millis) -> String {
    match Local.timestamp_millis_opt(t).single() {
        Some(dt) => dt.format("%H:%M").to_string(),
        None => String::new(),
    }
}

/// Header clock, e.g. "09:05PM"
pub fn clock_label(t: Millis) -> String {
    match Local.timestamp_millis_opt(t).single() {
        Some(dt) => dt.format("%I:%M%p").to_string(),
        None => String::new(),
    }
}

/// Dim the page overnight (22:00 to 06:59 local)
pub fn opacity_for_hour(hour: u32) -> f32 {
    if hour > 21 || hour < 7 {
        NIGHT_OPACITY
    } else {
        DAY_OPACITY
    }
}

fn body_opacity(now: Millis) -> f32 {
    Local
        .timestamp_millis_opt(now)
        .single()
        .map(|dt| opacity_for_hour(dt.hour()))
        .unwrap_or(DAY_OPACITY)
}
