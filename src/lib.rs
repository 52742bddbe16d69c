//! Glucose trend dashboard
//!
//! Follows a glucose feed over WebSocket and shows it at two resolutions:
//! - Focus pane: the last few hours, or a window the viewer scrubbed to
//! - Context pane: the whole history, with a brush selecting the focus window
//!
//! Everything that decides what is drawn lives in [`core`] and is platform
//! agnostic. The browser front end (`wasm` feature) and the headless CLI
//! (`cli` feature) only feed it events and consume its geometry.

pub mod config;
pub mod core;
pub mod time;
pub mod ws_state;

#[cfg(feature = "cli")]
pub mod websocket_native;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
mod app;
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
mod theme;
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
mod websocket_wasm;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
use wasm_bindgen::prelude::*;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
#[wasm_bindgen(start)]
pub fn start() {
    use wasm_bindgen::JsCast;

    console_error_panic_hook::set_once();

    // Initialize tracing for browser console
    tracing_wasm::set_as_global_default();

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async {
        let Some(canvas) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("canvas"))
            .and_then(|e| e.dyn_into::<web_sys::HtmlCanvasElement>().ok())
        else {
            tracing::error!("No canvas element to draw into");
            return;
        };

        if let Err(e) = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|cc| Ok(Box::new(app::GlucoseApp::new(cc)))),
            )
            .await
        {
            tracing::error!(?e, "Failed to start eframe");
        }
    });
}
