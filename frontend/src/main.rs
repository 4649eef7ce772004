//! Mixer console application.
//!
//! Supports both WASM (for web browsers) and native modes.

#![warn(clippy::all, rust_2018_idioms)]

// ============================================================================
// WASM Entry Point
// ============================================================================

#[cfg(target_arch = "wasm32")]
fn main() {
    use mixconsole_frontend::{ConsoleConfig, MixConsoleApp};
    use wasm_bindgen::JsCast;

    // Initialize panic handler for better error messages in browser console
    console_error_panic_hook::set_once();

    // Initialize tracing for WASM
    tracing_wasm::set_as_global_default();

    let config = ConsoleConfig::from_build_env();
    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async move {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            tracing::error!("No document to attach to");
            return;
        };
        let Some(canvas) = document
            .get_element_by_id("mixconsole_canvas")
            .and_then(|el| el.dyn_into::<web_sys::HtmlCanvasElement>().ok())
        else {
            tracing::error!("mixconsole_canvas is missing or not a canvas");
            return;
        };

        let result = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(move |cc| Ok(Box::new(MixConsoleApp::new(cc, config)))),
            )
            .await;
        if let Err(e) = result {
            tracing::error!("Failed to start eframe: {:?}", e);
        }
    });
}

// ============================================================================
// Native Entry Point
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
#[derive(clap::Parser, Debug)]
#[command(name = "mixconsole", version, about = "Digital mixer console")]
struct Args {
    /// WebSocket endpoint of the mixer backend
    #[arg(long, env = "MIXCONSOLE_WS_URL")]
    ws_url: Option<String>,

    /// Throttle window for continuous controls, in milliseconds
    #[arg(long)]
    throttle_ms: Option<u64>,

    /// Delay between reconnection attempts, in seconds
    #[arg(long)]
    reconnect_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use clap::Parser;
    use mixconsole_frontend::{ConfigOverrides, ConsoleConfig};

    let args = Args::parse();
    let config = ConsoleConfig::from_figment(ConfigOverrides {
        ws_url: args.ws_url,
        throttle_ms: args.throttle_ms,
        reconnect_interval_secs: args.reconnect_secs,
        log_level: args.log_level,
    })?;

    // RUST_LOG wins over the configured level
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(config.log_level.as_deref().unwrap_or("info"))
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting mixer console in native mode");

    let runtime = tokio::runtime::Runtime::new()?;
    let _guard = runtime.enter();

    mixconsole_frontend::run_native(config)
        .map_err(|e| anyhow::anyhow!("Failed to run console: {}", e))
}
