use bossagent_core::models::RuntimeConfig;
use bossagent_core::{ClientView, SessionHandle};
use tauri::State;

/// Current view, for a webview that (re)loads after updates were emitted
#[tauri::command]
pub async fn view_snapshot(session: State<'_, SessionHandle>) -> Result<ClientView, String> {
    session.snapshot().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn send_message(
    session: State<'_, SessionHandle>,
    message: String,
) -> Result<(), String> {
    session.send_message(message).await.map_err(|e| e.to_string())
}

/// Ask the assistant for a follow-up without a user message
#[tauri::command]
pub async fn send_nudge(session: State<'_, SessionHandle>) -> Result<(), String> {
    session.nudge().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn save_config(
    session: State<'_, SessionHandle>,
    config: RuntimeConfig,
) -> Result<(), String> {
    session.save_config(config).await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn clear_history(session: State<'_, SessionHandle>) -> Result<(), String> {
    session.clear_history().await.map_err(|e| e.to_string())
}
