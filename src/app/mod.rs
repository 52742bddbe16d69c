//! Browser dashboard
//!
//! A thin adapter: feed frames and pointer input become [`EngineEvent`]s, and
//! whatever geometry the engine produces is painted as-is.

mod chart;
mod header;

use eframe::egui;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::DashboardConfig;
use crate::core::layout::Padding;
use crate::core::{parse_feed, AlarmState, Engine, EngineEvent, FeedMessage};
use crate::theme::{colors, dashboard_visuals};
use crate::time::now_millis;
use crate::websocket_wasm::{MessageBuffer, WsClient};
use crate::ws_state::WsState;

/// Repaint at least this often so timers fire without input
const IDLE_REPAINT: Duration = Duration::from_millis(250);

pub struct GlucoseApp {
    pub(crate) engine: Engine,
    pub(crate) alarm: AlarmState,
    pub(crate) watchers: u32,
    pub(crate) focus_span: crate::core::Millis,
    /// Offset of the chart area inside the container
    pub(crate) padding: Padding,
    ws_state: Rc<RefCell<WsState>>,
    ws_client: Option<WsClient>,
    /// Buffered feed frames, drained with a time budget
    msg_buffer: MessageBuffer,
    /// Brush drag in progress
    pub(crate) drag: Option<chart::Drag>,
    /// Last container size handed to the engine
    pub(crate) last_size: Option<egui::Vec2>,
}

impl GlucoseApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        cc.egui_ctx.set_visuals(dashboard_visuals());

        let mut config = DashboardConfig::default();
        if let Some(url) = js_sys::eval("window.__glucose_ws_url").ok().and_then(|v| v.as_string()) {
            config.ws_url = url;
        }
        info!(url = %config.ws_url, "Feed URL resolved");

        let ws_state = Rc::new(RefCell::new(WsState::Connecting));
        let msg_buffer: MessageBuffer = Rc::new(RefCell::new(VecDeque::new()));
        let ws_client = WsClient::connect(&config.ws_url, msg_buffer.clone(), ws_state.clone()).ok();

        Self {
            engine: Engine::new(&config, now_millis()),
            alarm: AlarmState::new(),
            watchers: 0,
            focus_span: config.focus_span_ms,
            padding: config.padding,
            ws_state,
            ws_client,
            msg_buffer,
            drag: None,
            last_size: None,
        }
    }

    /// Hand buffered feed frames to the engine, yielding after ~12ms
    fn process_messages(&mut self) {
        const BUDGET_MS: f64 = 12.0;
        let deadline = js_sys::Date::now() + BUDGET_MS;
        loop {
            let Some(msg) = self.msg_buffer.borrow_mut().pop_front() else { break };
            let now = now_millis();
            match parse_feed(&msg) {
                Some(FeedMessage::Batch(batch)) => self.engine.push(EngineEvent::DataArrived(batch), now),
                Some(FeedMessage::Now(t)) => self.engine.push(EngineEvent::Now(t), now),
                Some(FeedMessage::Alarm(kind)) => self.alarm.raise(kind),
                Some(FeedMessage::ClearAlarm) => {
                    self.alarm.clear();
                }
                Some(FeedMessage::Clients(n)) => self.watchers = n,
                None => {}
            }
            if js_sys::Date::now() >= deadline {
                debug!("Feed budget exhausted, continuing next frame");
                break;
            }
        }
    }

    pub(crate) fn ws_state(&self) -> WsState {
        self.ws_state.borrow().clone()
    }

    /// Silence the running alarm and tell the server
    pub(crate) fn acknowledge_alarm(&mut self, silence: crate::core::Millis) {
        let frame = self.alarm.acknowledge(silence);
        if let Some(client) = &self.ws_client {
            client.send(&frame);
        }
    }
}

impl eframe::App for GlucoseApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.request_repaint_after(IDLE_REPAINT);

        self.process_messages();
        self.engine.process(now_millis());

        let opacity = self.engine.geometry().map_or(1.0, |g| g.body_opacity);

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(colors::BG_PRIMARY))
            .show(ctx, |ui| {
                ui.set_opacity(opacity);
                self.render_header(ui);
                ui.add_space(8.0);
                self.render_chart(ui);
            });
    }
}
