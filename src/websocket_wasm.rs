//! WASM feed client

use crate::ws_state::WsState;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use tracing::{debug, error, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, ErrorEvent, MessageEvent, WebSocket};

/// Shared message buffer: the socket callback pushes, the app drains in update()
pub type MessageBuffer = Rc<RefCell<VecDeque<String>>>;

pub struct WsClient {
    ws: WebSocket,
    state: Rc<RefCell<WsState>>,
}

impl WsClient {
    /// Connect to a feed endpoint
    ///
    /// Frames are buffered into `msg_buffer` and handed to the engine on the next frame.
    pub fn connect(
        url: &str,
        msg_buffer: MessageBuffer,
        state: Rc<RefCell<WsState>>,
    ) -> Result<Self, JsValue> {
        info!(url, "Connecting to feed");

        let ws = WebSocket::new(url)?;

        let state_clone = state.clone();
        let on_open = Closure::wrap(Box::new(move |_| {
            info!("Feed connected");
            *state_clone.borrow_mut() = WsState::Connected;
        }) as Box<dyn Fn(JsValue)>);
        ws.set_onopen(Some(on_open.as_ref().unchecked_ref()));
        on_open.forget();

        let on_msg = Closure::wrap(Box::new(move |e: MessageEvent| {
            if let Ok(txt) = e.data().dyn_into::<js_sys::JsString>() {
                let msg: String = txt.into();
                msg_buffer.borrow_mut().push_back(msg);
            }
        }) as Box<dyn Fn(MessageEvent)>);
        ws.set_onmessage(Some(on_msg.as_ref().unchecked_ref()));
        on_msg.forget();

        let state_clone = state.clone();
        let on_err = Closure::wrap(Box::new(move |e: ErrorEvent| {
            let msg = e.message();
            error!(error = %msg, "Feed error");
            *state_clone.borrow_mut() = WsState::Error(msg);
        }) as Box<dyn Fn(ErrorEvent)>);
        ws.set_onerror(Some(on_err.as_ref().unchecked_ref()));
        on_err.forget();

        let state_clone = state.clone();
        let on_close = Closure::wrap(Box::new(move |e: CloseEvent| {
            let code = e.code();
            let reason = e.reason();
            warn!(code, reason = %reason, "Feed closed");
            *state_clone.borrow_mut() = WsState::Disconnected;
        }) as Box<dyn Fn(CloseEvent)>);
        ws.set_onclose(Some(on_close.as_ref().unchecked_ref()));
        on_close.forget();

        Ok(Self { ws, state })
    }

    /// Send a frame to the server (alarm acks). Dropped while not connected.
    pub fn send(&self, frame: &str) {
        if !self.state.borrow().is_connected() {
            warn!("Feed not connected, frame dropped");
            return;
        }
        debug!(frame, "Sending frame");
        if let Err(e) = self.ws.send_with_str(frame) {
            error!(?e, "Failed to send frame");
        }
    }
}
