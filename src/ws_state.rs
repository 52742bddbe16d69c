//! Shared feed connection state
//!
//! Used by both WASM and native WebSocket clients.

/// WebSocket connection state
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WsState {
    Connecting,
    Connected,
    Disconnected,
    Error(String),
}

impl WsState {
    pub fn is_connected(&self) -> bool {
        matches!(self, WsState::Connected)
    }

    /// Short status text for the header and CLI logs
    pub fn label(&self) -> &str {
        match self {
            WsState::Connecting => "Connecting...",
            WsState::Connected => "Connected",
            WsState::Disconnected => "Disconnected",
            WsState::Error(_) => "Error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert!(WsState::Connected.is_connected());
        assert!(!WsState::Error("refused".into()).is_connected());
        assert_eq!(WsState::Disconnected.label(), "Disconnected");
    }
}
