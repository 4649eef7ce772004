//! Channel-based IPC between the transport tasks and the UI thread.

use std::sync::mpsc::{channel, Receiver, Sender};

use mixconsole_types::{ConnectionStatus, ServerUpdate};

/// Messages sent from async operations to the main UI thread.
#[derive(Debug)]
pub enum AppMessage {
    /// Decoded frame from the mixer backend
    ServerUpdate(ServerUpdate),
    /// WebSocket lifecycle transition
    ConnectionStatusChanged(ConnectionStatus),
}

/// Application state with channel-based communication.
pub struct AppStateChannels {
    /// Sender for app messages (cloned for each async operation)
    pub tx: Sender<AppMessage>,
    /// Receiver for app messages (owned by main UI thread)
    pub rx: Receiver<AppMessage>,
}

impl AppStateChannels {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self { tx, rx }
    }

    /// Get a clone of the sender for use in async operations.
    pub fn sender(&self) -> Sender<AppMessage> {
        self.tx.clone()
    }
}

impl Default for AppStateChannels {
    fn default() -> Self {
        Self::new()
    }
}
