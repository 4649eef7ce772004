//! Main application structure.

use std::time::Duration;

use egui::Context;
use mixconsole_types::InferencingState;

use crate::config::ConsoleConfig;
use crate::console::Console;
use crate::inference::InferenceWorkflow;
use crate::state::{AppMessage, AppStateChannels};
use crate::store::MixerStore;
use crate::ws::WsTransport;

/// Repaint cadence while the inference progress bar is moving.
const ANIMATION_INTERVAL: Duration = Duration::from_millis(100);

/// The mixer console application.
pub struct MixConsoleApp {
    store: MixerStore,
    workflow: InferenceWorkflow,
    console: Console,
    transport: WsTransport,
    channels: AppStateChannels,
}

impl MixConsoleApp {
    /// Create the app and open the backend connection.
    pub fn new(cc: &eframe::CreationContext<'_>, config: ConsoleConfig) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        let mut transport = WsTransport::new(config.ws_url.clone(), config.reconnect_interval());
        let channels = AppStateChannels::new();

        let mut store = MixerStore::new(transport.handle()).with_window(config.throttle_window());
        store.subscribe(
            |doc| doc.inferencing_state,
            |stage: &InferencingState| tracing::info!("Inferencing stage: {}", stage),
        );

        transport.connect(channels.sender(), cc.egui_ctx.clone());

        Self {
            store,
            workflow: InferenceWorkflow::new(),
            console: Console::new(),
            transport,
            channels,
        }
    }

    /// Process pending messages from the transport.
    fn process_messages(&mut self) {
        while let Ok(msg) = self.channels.rx.try_recv() {
            match msg {
                AppMessage::ServerUpdate(update) => {
                    self.store.apply_server_update(update);
                }
                AppMessage::ConnectionStatusChanged(status) => {
                    self.store.set_connection_status(status);
                }
            }
        }
    }

    /// Schedule the next frame for pending throttle timers and the countdown.
    fn schedule_repaint(&self, ctx: &Context) {
        let now = self.store.now();
        let deadline = [self.store.next_deadline(), self.workflow.next_deadline()]
            .into_iter()
            .flatten()
            .min();

        if let Some(deadline) = deadline {
            ctx.request_repaint_after(deadline.saturating_duration_since(now));
        }
        if self.workflow.is_animating() {
            ctx.request_repaint_after(ANIMATION_INTERVAL);
        }
    }

    fn shutdown(&mut self) {
        self.workflow.teardown();
        self.transport.disconnect();
        self.store.reset_session();
    }
}

impl eframe::App for MixConsoleApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.process_messages();

        self.store.tick();
        let now = self.store.now();
        self.workflow.tick(&mut self.store, now);

        self.console.show(ctx, &mut self.store, &mut self.workflow);

        self.schedule_repaint(ctx);
    }
}

impl Drop for MixConsoleApp {
    fn drop(&mut self) {
        tracing::info!("Mixer console shutting down");
        self.shutdown();
    }
}
