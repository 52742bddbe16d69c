//! Dark dashboard theme

use egui::Color32;

use crate::core::SeriesTag;

/// Black background, white chrome, grey reference lines
pub mod colors {
    use super::Color32;

    // === Backgrounds ===
    pub const BG_PRIMARY: Color32 = Color32::from_rgb(0, 0, 0);           // #000000
    pub const BG_ELEVATED: Color32 = Color32::from_rgb(12, 12, 12);       // #0C0C0C
    pub const BG_HOVER: Color32 = Color32::from_rgb(24, 24, 24);          // #181818

    // === Text ===
    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(255, 255, 255);   // #FFFFFF
    pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(160, 160, 160); // #A0A0A0
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(80, 80, 80);        // #505050

    // === Lines & Borders ===
    pub const BORDER: Color32 = Color32::from_rgb(40, 40, 40);            // #282828
    pub const REF_LINE: Color32 = Color32::from_rgb(128, 128, 128);       // grey, dashed
    pub const OPEN_LINE: Color32 = Color32::from_rgb(255, 255, 255);      // brush outline
    pub const BRUSH_FILL: Color32 = Color32::from_rgba_premultiplied(20, 20, 20, 40);

    // === Series ===
    pub const RAW: Color32 = Color32::from_rgb(128, 128, 128);            // grey
    pub const SMOOTHED: Color32 = Color32::from_rgb(0, 0, 255);           // blue
    pub const PREDICTED: Color32 = Color32::from_rgb(255, 0, 0);          // red

    // === Status ===
    pub const OK: Color32 = Color32::from_rgb(100, 200, 100);
    pub const PENDING: Color32 = Color32::from_rgb(200, 200, 100);
    pub const ALERT: Color32 = Color32::from_rgb(200, 100, 100);
}

pub fn series_color(tag: SeriesTag) -> Color32 {
    match tag {
        SeriesTag::Raw => colors::RAW,
        SeriesTag::Smoothed => colors::SMOOTHED,
        SeriesTag::Predicted => colors::PREDICTED,
    }
}

/// Apply an opacity in [0, 1] to a color
pub fn faded(color: Color32, opacity: f32) -> Color32 {
    color.gamma_multiply(opacity.clamp(0.0, 1.0))
}

/// Create the dashboard's egui Visuals
pub fn dashboard_visuals() -> egui::Visuals {
    use colors::*;

    let mut visuals = egui::Visuals::dark();

    visuals.panel_fill = BG_PRIMARY;
    visuals.window_fill = BG_PRIMARY;
    visuals.extreme_bg_color = BG_PRIMARY;
    visuals.faint_bg_color = BG_ELEVATED;

    visuals.override_text_color = Some(TEXT_PRIMARY);

    visuals.widgets.noninteractive.bg_fill = BG_PRIMARY;
    visuals.widgets.noninteractive.fg_stroke = egui::Stroke::new(1.0, TEXT_MUTED);
    visuals.widgets.noninteractive.bg_stroke = egui::Stroke::new(1.0, BORDER);

    visuals.widgets.inactive.bg_fill = BG_PRIMARY;
    visuals.widgets.inactive.fg_stroke = egui::Stroke::new(1.0, TEXT_SECONDARY);
    visuals.widgets.inactive.bg_stroke = egui::Stroke::new(1.0, BORDER);
    visuals.widgets.inactive.weak_bg_fill = BG_PRIMARY;

    visuals.widgets.hovered.bg_fill = BG_ELEVATED;
    visuals.widgets.hovered.fg_stroke = egui::Stroke::new(1.0, TEXT_PRIMARY);
    visuals.widgets.hovered.bg_stroke = egui::Stroke::new(1.0, TEXT_MUTED);
    visuals.widgets.hovered.weak_bg_fill = BG_ELEVATED;

    visuals.widgets.active.bg_fill = BG_HOVER;
    visuals.widgets.active.fg_stroke = egui::Stroke::new(1.0, TEXT_PRIMARY);
    visuals.widgets.active.bg_stroke = egui::Stroke::new(1.0, TEXT_SECONDARY);
    visuals.widgets.active.weak_bg_fill = BG_HOVER;

    visuals.selection.bg_fill = Color32::from_rgb(60, 60, 60);
    visuals.selection.stroke = egui::Stroke::new(1.0, TEXT_PRIMARY);

    // Flat
    visuals.window_shadow = egui::Shadow::NONE;
    visuals.popup_shadow = egui::Shadow::NONE;

    visuals
}
