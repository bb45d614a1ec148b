use bossagent_core::{ClientView, ViewSink};
use tauri::{AppHandle, Emitter};

/// Event the webview listens on for view updates
pub const VIEW_EVENT: &str = "view-updated";

/// Pushes every view change to the webview
pub struct WebviewSink {
    app: AppHandle,
}

impl WebviewSink {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl ViewSink for WebviewSink {
    fn publish(&self, view: &ClientView) {
        if let Err(e) = self.app.emit(VIEW_EVENT, view) {
            log::warn!("[View] Failed to emit {}: {}", VIEW_EVENT, e);
        }
    }
}
