use bossagent_core::{DirectoryPicker, HostBridge};
use std::path::PathBuf;
use tauri::AppHandle;
use tauri_plugin_dialog::DialogExt;

/// Bridge as managed by the app
pub type Bridge = HostBridge<DialogPicker>;

/// Native folder chooser backed by the dialog plugin
pub struct DialogPicker {
    app: AppHandle,
}

impl DialogPicker {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl DirectoryPicker for DialogPicker {
    fn pick_directory(&self) -> Option<PathBuf> {
        self.app
            .dialog()
            .file()
            .set_title("Select documents directory")
            .blocking_pick_folder()
            .and_then(|picked| picked.into_path().ok())
    }
}
