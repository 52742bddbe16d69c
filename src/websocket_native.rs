//! Native feed client
//!
//! Runs tokio-tungstenite on a spawned task with channel-based message passing.
//! Outbound frames (alarm acks) go through a second channel. The connection is
//! re-established after a drop, like the browser socket does.

use crate::ws_state::WsState;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Native WebSocket client running on the tokio runtime
pub struct NativeWsClient {
    /// Incoming text frames
    pub rx: UnboundedReceiver<String>,
    /// Shared connection state
    pub state: Arc<Mutex<WsState>>,
    outbound: UnboundedSender<String>,
}

impl NativeWsClient {
    /// Connect to a feed endpoint. Must be called from within a tokio runtime.
    pub fn connect(url: &str) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let state = Arc::new(Mutex::new(WsState::Connecting));

        let url = url.to_string();
        let state_clone = state.clone();
        tokio::spawn(async move {
            Self::run(url, tx, outbound_rx, state_clone).await;
        });

        Self { rx, state, outbound }
    }

    /// Queue a frame for the server. Returns false once the client has shut down.
    pub fn send(&self, frame: String) -> bool {
        self.outbound.send(frame).is_ok()
    }

    pub fn state(&self) -> WsState {
        self.state.lock().clone()
    }

    async fn run(
        url: String,
        tx: UnboundedSender<String>,
        mut outbound: UnboundedReceiver<String>,
        state: Arc<Mutex<WsState>>,
    ) {
        loop {
            *state.lock() = WsState::Connecting;
            let keep_going = Self::run_websocket(&url, &tx, &mut outbound, &state).await;
            if !keep_going || tx.is_closed() {
                break;
            }
            debug!(delay_s = RECONNECT_DELAY.as_secs(), "Reconnecting");
            tokio::time::sleep(RECONNECT_DELAY).await;
        }
    }

    /// One connection lifetime. Returns false when the app side has gone away.
    async fn run_websocket(
        url: &str,
        tx: &UnboundedSender<String>,
        outbound: &mut UnboundedReceiver<String>,
        state: &Arc<Mutex<WsState>>,
    ) -> bool {
        use futures_util::{SinkExt, StreamExt};
        use tokio_tungstenite::{connect_async, tungstenite::Message};

        info!(url, "Connecting to feed");

        let ws_stream = match connect_async(url).await {
            Ok((stream, _)) => {
                info!("Feed connected");
                *state.lock() = WsState::Connected;
                stream
            }
            Err(e) => {
                error!(error = %e, "Failed to connect");
                *state.lock() = WsState::Error(e.to_string());
                return true;
            }
        };

        let (mut write, mut read) = ws_stream.split();

        loop {
            tokio::select! {
                msg = read.next() => match msg {
                    Some(Ok(Message::Text(text))) => {
                        if tx.send(text.to_string()).is_err() {
                            // Receiver dropped, exit
                            return false;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        warn!("Feed closed by server");
                        *state.lock() = WsState::Disconnected;
                        return true;
                    }
                    Some(Err(e)) => {
                        error!(error = %e, "Feed error");
                        *state.lock() = WsState::Error(e.to_string());
                        return true;
                    }
                    _ => {}
                },
                frame = outbound.recv() => {
                    let Some(frame) = frame else { return false };
                    debug!(frame = %frame, "Sending frame");
                    if let Err(e) = write.send(Message::Text(frame.into())).await {
                        error!(error = %e, "Failed to send frame");
                        *state.lock() = WsState::Error(e.to_string());
                        return true;
                    }
                }
            }
        }
    }
}
