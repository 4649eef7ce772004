//! WebSocket transport to the mixer backend.
//!
//! Supports both WASM (using gloo-net) and native (using tokio-tungstenite)
//! platforms. Inbound frames are decoded and handed to the UI thread over
//! the app channel. Outbound patches go through [`WsSender`], which writes
//! to the live connection or drops the batch with a warning.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;

use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use mixconsole_types::{ConnectionStatus, PatchOp, ServerUpdate};
use parking_lot::Mutex;

use crate::state::AppMessage;
use crate::transport::Transport;

/// Sending half of one connection, tagged with the `connect` call that
/// opened it.
struct Writer {
    generation: u64,
    sender: UnboundedSender<String>,
}

/// Writer for the currently open connection, if any.
type Outbound = Arc<Mutex<Option<Writer>>>;

/// WebSocket client with fixed-interval reconnection.
pub struct WsTransport {
    url: String,
    reconnect_interval: Duration,
    outbound: Outbound,
    /// Set by [`WsTransport::disconnect`]; suppresses reconnection.
    stop: Arc<AtomicBool>,
    /// Bumped on every `connect`.
    generation: u64,
}

impl WsTransport {
    pub fn new(url: impl Into<String>, reconnect_interval: Duration) -> Self {
        Self {
            url: url.into(),
            reconnect_interval,
            outbound: Arc::new(Mutex::new(None)),
            stop: Arc::new(AtomicBool::new(true)),
            generation: 0,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Start the connection loop. It reconnects after every unexpected close
    /// until [`WsTransport::disconnect`] is called.
    ///
    /// The `tx` sender will be used to send messages to the main UI thread.
    /// The `ctx` is used to request repaints when frames are received.
    pub fn connect(&mut self, tx: Sender<AppMessage>, ctx: egui::Context) {
        // A loop from an earlier connect keeps its own flag and winds down.
        self.stop.store(true, Ordering::SeqCst);
        self.stop = Arc::new(AtomicBool::new(false));
        self.generation += 1;

        tracing::info!("Connecting to mixer backend: {}", self.url);

        let link = Link {
            url: self.url.clone(),
            reconnect_interval: self.reconnect_interval,
            outbound: Arc::clone(&self.outbound),
            stop: Arc::clone(&self.stop),
            generation: self.generation,
            tx,
            ctx,
        };

        #[cfg(target_arch = "wasm32")]
        {
            wasm_bindgen_futures::spawn_local(link.wasm_connection_loop());
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            tokio::spawn(link.native_connection_loop());
        }
    }

    /// Close the connection and stop reconnecting.
    pub fn disconnect(&mut self) {
        tracing::info!("Disconnecting from mixer backend");
        self.stop.store(true, Ordering::SeqCst);
        // Dropping the writer ends the forwarding half, which closes the socket.
        self.outbound.lock().take();
    }

    /// Whether a connection is currently open for writing.
    pub fn is_open(&self) -> bool {
        self.outbound.lock().is_some()
    }

    /// Cheap handle for sending patches over whichever connection is open.
    pub fn handle(&self) -> WsSender {
        WsSender {
            outbound: Arc::clone(&self.outbound),
        }
    }
}

/// Sending half of a [`WsTransport`].
#[derive(Clone)]
pub struct WsSender {
    outbound: Outbound,
}

impl Transport for WsSender {
    fn send(&self, ops: Vec<PatchOp>) {
        let text = match serde_json::to_string(&ops) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Failed to encode outbound patch: {}", e);
                return;
            }
        };

        match self.outbound.lock().as_ref() {
            Some(writer) => {
                tracing::trace!("Sending patch: {}", text);
                if writer.sender.unbounded_send(text).is_err() {
                    tracing::warn!("WebSocket is closing, dropped patch ({} ops)", ops.len());
                }
            }
            None => {
                tracing::warn!("WebSocket is not open, dropped patch ({} ops)", ops.len());
            }
        }
    }
}

/// Everything a connection loop needs, moved into the spawned task.
struct Link {
    url: String,
    reconnect_interval: Duration,
    outbound: Outbound,
    stop: Arc<AtomicBool>,
    generation: u64,
    tx: Sender<AppMessage>,
    ctx: egui::Context,
}

impl Link {
    fn stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    fn status(&self, status: ConnectionStatus) {
        let _ = self.tx.send(AppMessage::ConnectionStatusChanged(status));
        self.ctx.request_repaint();
    }

    /// Install `sender` as the live writer unless a newer connection
    /// already owns the slot.
    fn install_writer(&self, sender: UnboundedSender<String>) {
        let mut slot = self.outbound.lock();
        if slot
            .as_ref()
            .is_some_and(|writer| writer.generation > self.generation)
        {
            tracing::debug!("Newer connection owns the writer, not replacing it");
            return;
        }
        *slot = Some(Writer {
            generation: self.generation,
            sender,
        });
    }

    /// Install a fresh writer for a newly opened connection.
    fn open_writer(&self) -> UnboundedReceiver<String> {
        let (sender, reader) = unbounded();
        self.install_writer(sender);
        reader
    }

    /// Clear the slot if it still holds this loop's writer.
    fn close_writer(&self) {
        let mut slot = self.outbound.lock();
        if slot
            .as_ref()
            .is_some_and(|writer| writer.generation == self.generation)
        {
            slot.take();
        }
    }

    fn handle_text(&self, text: &str) {
        tracing::trace!("Received WebSocket message: {}", text);

        match ServerUpdate::from_json(text) {
            Ok(update) => {
                tracing::trace!("Parsed server update: {}", update.description());
                let _ = self.tx.send(AppMessage::ServerUpdate(update));
                self.ctx.request_repaint();
            }
            Err(e) => {
                tracing::error!("Ignoring frame from mixer backend: {}", e);
            }
        }
    }
}

// ============================================================================
// WASM Implementation (using gloo-net)
// ============================================================================

#[cfg(target_arch = "wasm32")]
impl Link {
    async fn wasm_connection_loop(self) {
        use futures::{future, SinkExt, StreamExt};
        use gloo_net::websocket::{futures::WebSocket, Message};
        use gloo_timers::future::sleep;

        while !self.stopped() {
            self.status(ConnectionStatus::Connecting);
            tracing::info!("WebSocket connection attempt to: {}", self.url);

            match WebSocket::open(&self.url) {
                Ok(ws) => {
                    let (mut sink, mut source) = ws.split();
                    let (writer, mut reader) = unbounded::<String>();
                    // The browser socket confirms the connection with its first frame.
                    let mut writer = Some(writer);

                    let forward = async {
                        while let Some(text) = reader.next().await {
                            if let Err(e) = sink.send(Message::Text(text)).await {
                                tracing::error!("WebSocket send failed: {:?}", e);
                                break;
                            }
                        }
                    };

                    let receive = async {
                        while let Some(msg) = source.next().await {
                            if self.stopped() {
                                break;
                            }
                            match msg {
                                Ok(Message::Text(text)) => {
                                    if let Some(writer) = writer.take() {
                                        tracing::info!("WebSocket connected");
                                        self.install_writer(writer);
                                        self.status(ConnectionStatus::Connected);
                                    }
                                    self.handle_text(&text);
                                }
                                Ok(Message::Bytes(_)) => {
                                    tracing::trace!("Received binary message (ignored)");
                                }
                                Err(e) => {
                                    tracing::error!("WebSocket error: {:?}", e);
                                    break;
                                }
                            }
                        }
                    };

                    future::select(std::pin::pin!(forward), std::pin::pin!(receive)).await;

                    self.close_writer();
                    if !self.stopped() {
                        tracing::warn!("WebSocket connection lost");
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to open WebSocket: {:?}", e);
                }
            }

            self.status(ConnectionStatus::Disconnected);
            if self.stopped() {
                break;
            }
            tracing::info!("Reconnecting in {:?}", self.reconnect_interval);
            sleep(self.reconnect_interval).await;
        }

        tracing::info!("WebSocket loop stopped");
    }
}

// ============================================================================
// Native Implementation (using tokio-tungstenite)
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
impl Link {
    async fn native_connection_loop(self) {
        use futures::{future, SinkExt, StreamExt};
        use tokio::time::sleep;
        use tokio_tungstenite::{connect_async, tungstenite::Message};

        while !self.stopped() {
            self.status(ConnectionStatus::Connecting);
            tracing::info!("WebSocket connection attempt to: {}", self.url);

            match connect_async(&self.url).await {
                Ok((ws_stream, _)) if !self.stopped() => {
                    tracing::info!("WebSocket connected successfully");
                    let mut reader = self.open_writer();
                    self.status(ConnectionStatus::Connected);

                    let (mut sink, mut source) = ws_stream.split();

                    let forward = async {
                        while let Some(text) = reader.next().await {
                            if let Err(e) = sink.send(Message::text(text)).await {
                                tracing::error!("WebSocket send failed: {:?}", e);
                                break;
                            }
                        }
                        let _ = sink.close().await;
                    };

                    let receive = async {
                        while let Some(msg_result) = source.next().await {
                            if self.stopped() {
                                break;
                            }
                            match msg_result {
                                Ok(Message::Text(text)) => self.handle_text(text.as_str()),
                                Ok(Message::Binary(_)) => {
                                    tracing::trace!("Received binary message (ignored)");
                                }
                                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                                    // Pong is automatically handled by tokio-tungstenite
                                }
                                Ok(Message::Close(_)) => {
                                    tracing::info!("WebSocket closed by server");
                                    break;
                                }
                                Ok(Message::Frame(_)) => {}
                                Err(e) => {
                                    tracing::error!("WebSocket error: {:?}", e);
                                    break;
                                }
                            }
                        }
                    };

                    future::select(std::pin::pin!(forward), std::pin::pin!(receive)).await;

                    self.close_writer();
                    if !self.stopped() {
                        tracing::warn!("WebSocket connection lost");
                    }
                }
                Ok(_) => {
                    tracing::info!("Disconnected while connecting, closing new socket");
                }
                Err(e) => {
                    tracing::error!("Failed to connect WebSocket: {}", e);
                }
            }

            self.status(ConnectionStatus::Disconnected);
            if self.stopped() {
                break;
            }
            tracing::info!("Reconnecting in {:?}", self.reconnect_interval);
            sleep(self.reconnect_interval).await;
        }

        tracing::info!("WebSocket loop stopped");
    }
}
