use bossagent_core::{BridgeConfig, SessionHandle};
use tauri::State;

use crate::services::Bridge;

/// Backend base URL and per-call timeouts
#[tauri::command]
pub fn bridge_config(bridge: State<'_, Bridge>) -> BridgeConfig {
    bridge.config().clone()
}

/// Open the native folder chooser. Returns the chosen path, or an empty
/// string when cancelled; a chosen path is applied to the config form.
#[tauri::command]
pub async fn select_directory(
    bridge: State<'_, Bridge>,
    session: State<'_, SessionHandle>,
) -> Result<String, String> {
    let path = bridge.select_directory().await;
    session
        .apply_directory(path.clone())
        .await
        .map_err(|e| e.to_string())?;
    Ok(path)
}
