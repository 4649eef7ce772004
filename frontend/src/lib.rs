//! Mixer console frontend library.
//!
//! The sync core (codec, throttle, store, inference workflow) is platform
//! independent and driven by an injected [`Transport`] and [`Clock`]. The
//! egui console and the WebSocket transport sit on top of it.

#![warn(clippy::all, rust_2018_idioms)]

mod app;
mod codec;
mod config;
mod console;
mod inference;
mod state;
mod store;
mod throttle;
mod transport;
mod ws;

pub use app::MixConsoleApp;
pub use codec::{apply_full_state, apply_patch, PatchError};
pub use config::{ConfigOverrides, ConsoleConfig, DEFAULT_RECONNECT_INTERVAL_SECS};
#[cfg(not(target_arch = "wasm32"))]
pub use config::{user_config_path, LOCAL_CONFIG_FILE};
pub use inference::InferenceWorkflow;
pub use state::{AppMessage, AppStateChannels};
pub use store::{MixerStore, SubscriptionId};
pub use throttle::{Clock, Dispatcher, ManualClock, SystemClock, DEFAULT_WINDOW};
pub use transport::{MemoryTransport, Transport};
pub use ws::{WsSender, WsTransport};

/// Open the console in a native window.
///
/// Must be called inside a tokio runtime context; the WebSocket loop is
/// spawned on it.
#[cfg(not(target_arch = "wasm32"))]
pub fn run_native(config: ConsoleConfig) -> eframe::Result<()> {
    tracing::info!("Initializing mixer console, backend {}", config.ws_url);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title("Mixer Console"),
        ..Default::default()
    };

    eframe::run_native(
        "Mixer Console",
        native_options,
        Box::new(move |cc| Ok(Box::new(MixConsoleApp::new(cc, config)))),
    )
}
