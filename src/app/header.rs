//! Header bar: clock, latest reading, alarm controls and status

use eframe::egui;

use super::GlucoseApp;
use crate::core::{clock_label, EngineEvent, ViewportMode, MINUTE_MS, SILENCE_OPTIONS_MIN};
use crate::theme::colors;
use crate::time::now_millis;
use crate::ws_state::WsState;

impl GlucoseApp {
    pub(crate) fn render_header(&mut self, ui: &mut egui::Ui) {
        let ws_state = self.ws_state();
        let bg = self.engine.store().latest_raw().map(|s| s.value);

        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(clock_label(self.engine.server_now())).size(24.0));
            ui.add_space(10.0);

            let bg_text = bg.map_or_else(|| "---".to_string(), |v| format!("{}", v.round() as i64));
            ui.label(egui::RichText::new(bg_text).size(24.0).color(colors::TEXT_PRIMARY));

            ui.add_space(10.0);

            if self.alarm.is_active() {
                let kind = self.alarm.current().map_or("alarm", |k| k.as_str());
                ui.colored_label(colors::ALERT, egui::RichText::new(kind));
                for minutes in SILENCE_OPTIONS_MIN {
                    if ui.button(format!("Silence {minutes}m")).clicked() {
                        self.acknowledge_alarm(minutes * MINUTE_MS);
                    }
                }
            }

            if self.engine.mode() == Some(ViewportMode::UserSelecting) {
                if ui.button("Now").clicked() {
                    self.engine.handle(EngineEvent::RevertToLive, now_millis());
                }
            }

            // RIGHT: status (right-to-left order)
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let status_color = match &ws_state {
                    WsState::Connected => colors::OK,
                    WsState::Connecting => colors::PENDING,
                    WsState::Disconnected | WsState::Error(_) => colors::ALERT,
                };
                ui.colored_label(status_color, egui::RichText::new(ws_state.label()));

                ui.label(egui::RichText::new("/").color(colors::TEXT_MUTED));
                ui.label(
                    egui::RichText::new(format!("{} watching", self.watchers))
                        .color(colors::TEXT_MUTED),
                );
            });
        });
    }
}
