//! Host bridge
//! The only host capabilities the UI layer can reach: the resolved backend
//! settings and a native directory chooser. There is no generic passthrough.

use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{HostConfig, Timeouts, DEFAULT_PORT};

/// Backend settings handed to the UI at boot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeConfig {
    pub base_url: String,
    pub timeouts: Timeouts,
}

impl BridgeConfig {
    pub fn from_host(config: &HostConfig) -> Self {
        Self {
            base_url: config.base_url(),
            timeouts: config.timeouts,
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            base_url: format!("http://127.0.0.1:{}", DEFAULT_PORT),
            timeouts: Timeouts::default(),
        }
    }
}

/// Native directory chooser. Blocks until the user picks or cancels.
pub trait DirectoryPicker: Send + Sync + 'static {
    fn pick_directory(&self) -> Option<PathBuf>;
}

pub struct HostBridge<P> {
    config: BridgeConfig,
    picker: Arc<P>,
}

impl<P: DirectoryPicker> HostBridge<P> {
    pub fn new(config: BridgeConfig, picker: P) -> Self {
        Self {
            config,
            picker: Arc::new(picker),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Open the directory chooser off the async workers. Returns the chosen
    /// absolute path, or an empty string when the user cancels.
    pub async fn select_directory(&self) -> String {
        let picker = Arc::clone(&self.picker);
        let picked = tokio::task::spawn_blocking(move || picker.pick_directory())
            .await
            .unwrap_or_else(|e| {
                log::warn!("[Bridge] Directory picker failed: {}", e);
                None
            });

        match picked {
            Some(path) => {
                let path = if path.is_relative() {
                    std::env::current_dir().map(|cwd| cwd.join(&path)).unwrap_or(path)
                } else {
                    path
                };
                log::info!("[Bridge] Directory selected: {}", path.display());
                path.display().to_string()
            }
            None => String::new(),
        }
    }
}
