//! Application configuration.
//!
//! Loaded from `$XDG_CONFIG_HOME/hyprtabs/config.json` (falling back to
//! `~/.config`).  A missing file means compiled-in defaults.
//!
//! # Example
//!
//! ```json
//! {
//!   "hyprctl": "hyprctl",
//!   "cache_ttl_ms": 100,
//!   "policy": "live",
//!   "store_path": "/tmp/minimize-state/windows.json",
//!   "waybar_signal": 8,
//!   "minimize_ignore_classes": ["wofi"],
//!   "visualizer": { "width": 600, "height": 400 }
//! }
//! ```

use crate::aggregate::ReconciliationPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name used for the config directory and the layer-shell namespace.
pub const APP_NAME: &str = "hyprtabs";

/// Top-level configuration.
///
/// Every field is optional; `{}` is a valid file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `hyprctl` binary to spawn.
    pub hyprctl: String,
    /// How long a `clients -j` snapshot is reused (ms).
    pub cache_ttl_ms: u64,
    /// Which source decides the window list.
    pub policy: ReconciliationPolicy,
    /// Minimized-window document.
    pub store_path: PathBuf,
    /// Single-instance lock file.
    pub lock_path: PathBuf,
    /// Command pipe of the running switcher.
    pub fifo_path: PathBuf,
    /// `pkill -RTMIN+<n> waybar` after CLI minimize/restore.  `null`
    /// disables the signal.
    pub waybar_signal: Option<u8>,
    /// Window classes the `minimize` subcommand leaves alone.
    pub minimize_ignore_classes: Vec<String>,
    /// Overlay size and timing.
    pub visualizer: VisualizerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hyprctl: "hyprctl".into(),
            cache_ttl_ms: 100,
            policy: ReconciliationPolicy::default(),
            store_path: PathBuf::from("/tmp/minimize-state/windows.json"),
            lock_path: PathBuf::from("/tmp/hyprtabs.lock"),
            fifo_path: PathBuf::from("/tmp/hyprtabs.fifo"),
            waybar_signal: Some(8),
            minimize_ignore_classes: vec!["wofi".into()],
            visualizer: VisualizerConfig::default(),
        }
    }
}

/// Overlay window settings.  Durations are in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    pub width: i32,
    pub height: i32,
    /// How often the FIFO channel is drained on the main loop.
    pub poll_ms: u64,
    /// Delay between activating a row and closing the overlay, so the
    /// compositor sees focus land before the layer surface goes away.
    pub close_delay_ms: u64,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 400,
            poll_ms: 16,
            close_delay_ms: 100,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    /// Whether the `minimize` subcommand should skip windows of `class`.
    pub fn ignores_class(&self, class: &str) -> bool {
        self.minimize_ignore_classes.iter().any(|c| c == class)
    }
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/hyprtabs`).
pub fn config_dir() -> PathBuf {
    config_dir_from(
        std::env::var("XDG_CONFIG_HOME").ok(),
        std::env::var("HOME").ok(),
    )
}

fn config_dir_from(xdg: Option<String>, home: Option<String>) -> PathBuf {
    let base = xdg.filter(|s| !s.is_empty()).unwrap_or_else(|| {
        let home = home.unwrap_or_else(|| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join(APP_NAME)
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
