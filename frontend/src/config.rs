//! Configuration management.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::throttle::DEFAULT_WINDOW;

/// Default interval between reconnection attempts.
pub const DEFAULT_RECONNECT_INTERVAL_SECS: u64 = 5;

/// Console configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// WebSocket endpoint of the mixer backend
    pub ws_url: String,
    /// Throttle window for continuous controls, in milliseconds
    pub throttle_ms: u64,
    /// Delay between reconnection attempts, in seconds
    pub reconnect_interval_secs: u64,
    /// Log level (trace, debug, info, warn, error)
    /// If not set, uses RUST_LOG environment variable or defaults to "info"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            ws_url: mixconsole_types::DEFAULT_WS_URL.to_string(),
            throttle_ms: DEFAULT_WINDOW.as_millis() as u64,
            reconnect_interval_secs: DEFAULT_RECONNECT_INTERVAL_SECS,
            log_level: None,
        }
    }
}

impl ConsoleConfig {
    pub fn throttle_window(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_secs(self.reconnect_interval_secs)
    }

    /// Configuration baked in at build time, for the browser build.
    ///
    /// `MIXCONSOLE_WS_URL` set while compiling overrides the endpoint.
    pub fn from_build_env() -> Self {
        Self {
            ws_url: option_env!("MIXCONSOLE_WS_URL")
                .unwrap_or(mixconsole_types::DEFAULT_WS_URL)
                .to_string(),
            ..Self::default()
        }
    }
}

/// Values given on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub ws_url: Option<String>,
    pub throttle_ms: Option<u64>,
    pub reconnect_interval_secs: Option<u64>,
    pub log_level: Option<String>,
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::{Path, PathBuf};

    use figment::{
        providers::{Env, Format, Serialized, Toml},
        Figment,
    };

    use super::{ConfigOverrides, ConsoleConfig};

    /// Name of the per-directory config file.
    pub const LOCAL_CONFIG_FILE: &str = ".mixconsole.toml";

    impl ConsoleConfig {
        /// Load configuration with full priority chain:
        /// CLI args > env vars > config files > defaults.
        ///
        /// Config files are searched in this order:
        /// 1. `.mixconsole.toml` in current directory
        /// 2. `config.toml` in user config directory (~/.config/mixconsole/ on Linux)
        pub fn from_figment(overrides: ConfigOverrides) -> anyhow::Result<Self> {
            let local_config = std::env::current_dir()
                .ok()
                .map(|d| d.join(LOCAL_CONFIG_FILE));
            let user_config = user_config_path();

            Self::from_sources(user_config.as_deref(), local_config.as_deref(), overrides)
        }

        /// Same layering as [`ConsoleConfig::from_figment`] with explicit file locations.
        pub fn from_sources(
            user_config: Option<&Path>,
            local_config: Option<&Path>,
            overrides: ConfigOverrides,
        ) -> anyhow::Result<Self> {
            // defaults < user config < local config < env vars < CLI args
            let mut figment = Figment::new().merge(Serialized::defaults(ConsoleConfig::default()));

            for path in [user_config, local_config].into_iter().flatten() {
                if path.exists() {
                    tracing::debug!("Reading config file {}", path.display());
                    figment = figment.merge(Toml::file(path));
                }
            }

            figment = figment.merge(Env::prefixed("MIXCONSOLE_"));

            if let Some(ref url) = overrides.ws_url {
                figment = figment.merge(Serialized::default("ws_url", url));
            }
            if let Some(ms) = overrides.throttle_ms {
                figment = figment.merge(Serialized::default("throttle_ms", ms));
            }
            if let Some(secs) = overrides.reconnect_interval_secs {
                figment = figment.merge(Serialized::default("reconnect_interval_secs", secs));
            }
            if let Some(ref level) = overrides.log_level {
                figment = figment.merge(Serialized::default("log_level", level));
            }

            Ok(figment.extract()?)
        }
    }

    /// User config file location, if the platform has one.
    pub fn user_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "mixconsole")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::{user_config_path, LOCAL_CONFIG_FILE};

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn clear_env() {
        std::env::remove_var("MIXCONSOLE_WS_URL");
        std::env::remove_var("MIXCONSOLE_THROTTLE_MS");
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = ConsoleConfig::from_sources(None, None, ConfigOverrides::default()).unwrap();

        assert_eq!(config, ConsoleConfig::default());
        assert_eq!(config.ws_url, "ws://localhost:8765");
        assert_eq!(config.throttle_window(), Duration::from_millis(20));
        assert_eq!(config.reconnect_interval(), Duration::from_secs(5));
    }

    #[test]
    #[serial]
    fn test_local_file_beats_user_file() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        let user = temp_dir.path().join("config.toml");
        let local = temp_dir.path().join(LOCAL_CONFIG_FILE);
        fs::write(&user, "ws_url = \"ws://mixer.local:9000\"\nthrottle_ms = 40\n").unwrap();
        fs::write(&local, "throttle_ms = 10\n").unwrap();

        let config =
            ConsoleConfig::from_sources(Some(&user), Some(&local), ConfigOverrides::default())
                .unwrap();

        assert_eq!(config.ws_url, "ws://mixer.local:9000");
        assert_eq!(config.throttle_ms, 10);
        assert_eq!(config.reconnect_interval_secs, 5);
    }

    #[test]
    #[serial]
    fn test_env_and_cli_precedence() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        let local = temp_dir.path().join(LOCAL_CONFIG_FILE);
        fs::write(&local, "ws_url = \"ws://from-file:1\"\nthrottle_ms = 30\n").unwrap();

        std::env::set_var("MIXCONSOLE_WS_URL", "ws://from-env:2");
        std::env::set_var("MIXCONSOLE_THROTTLE_MS", "35");
        let config = ConsoleConfig::from_sources(
            None,
            Some(&local),
            ConfigOverrides {
                throttle_ms: Some(50),
                log_level: Some("debug".to_string()),
                ..ConfigOverrides::default()
            },
        );
        clear_env();
        let config = config.unwrap();

        assert_eq!(config.ws_url, "ws://from-env:2");
        assert_eq!(config.throttle_ms, 50);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    #[serial]
    fn test_malformed_file_is_an_error() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        let local = temp_dir.path().join(LOCAL_CONFIG_FILE);
        fs::write(&local, "throttle_ms = \"fast\"\n").unwrap();

        let result = ConsoleConfig::from_sources(None, Some(&local), ConfigOverrides::default());
        assert!(result.is_err());
    }
}
