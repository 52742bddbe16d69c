//! Focus and context panes, painted from a geometry batch
//!
//! Also the brush input surface: dragging inside the brush slides it, dragging
//! elsewhere in the context pane draws a new extent, and a plain click centres
//! a focus-span window on the clicked time.

use eframe::egui::{self, Align2, Color32, FontId, Mesh, Pos2, Rect, Sense, Shape, Stroke, Vec2};

use super::GlucoseApp;
use crate::core::bubble::ArcSegment;
use crate::core::render::{Axis, GeometryBatch, PointGeometry};
use crate::core::{EngineEvent, Millis};
use crate::theme::{colors, faded, series_color};
use crate::time::now_millis;

/// Segments per arc when tessellating bubbles
const ARC_STEPS: usize = 24;

/// Brush drag in progress
#[derive(Debug, Clone, Copy)]
pub(crate) enum Drag {
    /// Sliding the existing brush; `grab` is the offset from its start
    Slide { grab: Millis, width: Millis },
    /// Drawing a new extent from `anchor`
    Draw { anchor: Millis },
}

impl GlucoseApp {
    pub(crate) fn render_chart(&mut self, ui: &mut egui::Ui) {
        let size = ui.available_size();
        let (rect, response) = ui.allocate_exact_size(size, Sense::click_and_drag());

        if self.last_size != Some(size) {
            self.last_size = Some(size);
            self.engine.handle(EngineEvent::Resize { width: size.x, height: size.y }, now_millis());
        }

        // Hit-test against what is on screen, then paint what the input produced
        if let Some(shown) = self.engine.geometry() {
            let origin = rect.min + Vec2::new(self.padding.left, self.padding.top);
            self.handle_brush_input(&response, origin, &shown);
        }

        let Some(batch) = self.engine.geometry() else {
            ui.painter().text(
                rect.center(),
                Align2::CENTER_CENTER,
                "Waiting for data...",
                FontId::proportional(14.0),
                colors::TEXT_MUTED,
            );
            return;
        };

        let batch = &batch;
        let origin = rect.min + Vec2::new(self.padding.left, self.padding.top);

        let painter = ui.painter_at(rect);
        let at = |(x, y): (f32, f32)| origin + Vec2::new(x, y);

        // Focus pane content is clipped to its own area
        let focus_clip = Rect::from_min_size(origin, Vec2::new(batch.layout.chart_width, batch.layout.focus_height));
        let focus_painter = painter.with_clip_rect(focus_clip);

        for line in &batch.lines {
            let (from, to) = (at(line.from), at(line.to));
            if line.kind.is_dashed() {
                painter.extend(Shape::dashed_line(&[from, to], Stroke::new(1.0, colors::REF_LINE), 3.0, 3.0));
            } else {
                painter.line_segment([from, to], Stroke::new(1.0, colors::OPEN_LINE));
            }
        }

        draw_points(&focus_painter, &batch.focus_points, at);
        draw_points(&painter, &batch.context_points, at);

        for glyph in &batch.treatments {
            let center = at(glyph.anchor);
            for arc in &glyph.arcs {
                draw_arc(&focus_painter, center, arc, glyph.font_size);
            }
        }

        let b = &batch.brush;
        painter.rect_filled(
            Rect::from_min_max(at((b.x0, b.y0)), at((b.x1, b.y1))),
            0.0,
            colors::BRUSH_FILL,
        );

        draw_time_axis(&painter, &batch.axes.focus_time, at);
        draw_time_axis(&painter, &batch.axes.context_time, at);
        draw_value_axis(&painter, &batch.axes.focus_value, at);
    }

    fn handle_brush_input(&mut self, response: &egui::Response, origin: Pos2, batch: &GeometryBatch) {
        let Some(scales) = self.engine.scales().copied() else { return };
        let Some(pos) = response.interact_pointer_pos() else { return };
        let local = pos - origin;
        let t = scales.context_x.invert(local.x);
        let in_context = local.y >= batch.layout.focus_height && local.y <= batch.layout.chart_height;
        let now = now_millis();
        let window = batch.brush.window;

        if response.drag_started() && in_context {
            self.drag = Some(if window.contains(t) {
                Drag::Slide { grab: t - window.start, width: window.width() }
            } else {
                Drag::Draw { anchor: t }
            });
            self.engine.push(EngineEvent::BrushStart, now);
        }

        if response.dragged() {
            let extent = match self.drag {
                Some(Drag::Slide { grab, width }) => Some((t - grab, t - grab + width)),
                Some(Drag::Draw { anchor }) if anchor != t => Some((anchor, t)),
                _ => None,
            };
            if let Some((start, end)) = extent {
                self.engine.push(EngineEvent::BrushMove { start, end }, now);
            }
        }

        if response.drag_stopped() && self.drag.take().is_some() {
            self.engine.push(EngineEvent::BrushEnd, now);
        }

        if response.clicked() && in_context {
            let start = t - self.focus_span / 2;
            self.engine.push(EngineEvent::BrushStart, now);
            self.engine.push(EngineEvent::BrushMove { start, end: start + self.focus_span }, now);
            self.engine.push(EngineEvent::BrushEnd, now);
        }

        self.engine.process(now);
    }
}

fn draw_points(painter: &egui::Painter, points: &[PointGeometry], at: impl Fn((f32, f32)) -> Pos2) {
    for p in points {
        painter.circle_filled(at((p.x, p.y)), p.radius, faded(series_color(p.tag), p.opacity));
    }
}

fn arc_point(center: Pos2, radius: f32, angle: f32) -> Pos2 {
    center + Vec2::new(radius * angle.sin(), -radius * angle.cos())
}

/// Annular sector as a triangle strip
fn draw_arc(painter: &egui::Painter, center: Pos2, arc: &ArcSegment, font_size: f32) {
    let [r, g, b, a] = arc.fill.rgba();
    if a > 0 && arc.outer_radius > arc.inner_radius {
        let color = Color32::from_rgba_unmultiplied(r, g, b, a);
        let mut mesh = Mesh::default();
        for i in 0..=ARC_STEPS {
            let angle = arc.start_angle + (arc.end_angle - arc.start_angle) * i as f32 / ARC_STEPS as f32;
            mesh.colored_vertex(arc_point(center, arc.inner_radius, angle), color);
            mesh.colored_vertex(arc_point(center, arc.outer_radius, angle), color);
        }
        for i in 0..ARC_STEPS as u32 {
            let k = i * 2;
            mesh.add_triangle(k, k + 1, k + 2);
            mesh.add_triangle(k + 1, k + 3, k + 2);
        }
        painter.add(Shape::mesh(mesh));
    }

    if let Some(label) = &arc.label {
        let (dx, dy) = arc.centroid();
        painter.text(
            center + Vec2::new(dx, dy),
            Align2::CENTER_CENTER,
            label,
            FontId::proportional(font_size),
            colors::TEXT_PRIMARY,
        );
    }
}

fn draw_time_axis(painter: &egui::Painter, axis: &Axis, at: impl Fn((f32, f32)) -> Pos2) {
    for tick in &axis.ticks {
        painter.text(
            at((tick.pos, axis.baseline + 2.0)),
            Align2::CENTER_TOP,
            &tick.label,
            FontId::proportional(10.0),
            colors::TEXT_SECONDARY,
        );
    }
}

fn draw_value_axis(painter: &egui::Painter, axis: &Axis, at: impl Fn((f32, f32)) -> Pos2) {
    for tick in &axis.ticks {
        painter.text(
            at((axis.baseline, tick.pos)),
            Align2::RIGHT_CENTER,
            &tick.label,
            FontId::proportional(10.0),
            colors::TEXT_SECONDARY,
        );
    }
}
