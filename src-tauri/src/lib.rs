/// BossAgent desktop host
/// Launches the local backend, waits for its health endpoint, then opens the
/// main window wired to a polling client session.
///
/// Module structure:
/// - commands: Tauri IPC handlers (frontend → host)
/// - services: dialog-backed directory picker and webview view sink

mod commands;
mod services;

use bossagent_core::{
    BackendClient, BridgeConfig, ClientSession, HealthGate, HostBridge, HostConfig, LaunchMode,
    LaunchPlan, ProcessSupervisor,
};
use services::{DialogPicker, WebviewSink};
use std::path::PathBuf;
use std::sync::Arc;
use tauri::{AppHandle, Manager, RunEvent, WebviewUrl, WebviewWindowBuilder};
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};

const MAIN_WINDOW: &str = "main";

/// Where the backend comes from: the bundled executable in release builds,
/// the server script run by an interpreter during development.
fn launch_plan(app: &AppHandle, config: &HostConfig) -> tauri::Result<LaunchPlan> {
    let mode = if cfg!(debug_assertions) {
        let script = config.server_script.clone().unwrap_or_else(|| {
            PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("..")
                .join("server.py")
        });
        LaunchMode::Script {
            interpreter: config.interpreter.clone(),
            script,
        }
    } else {
        LaunchMode::Packaged {
            resources_dir: app.path().resource_dir()?,
        }
    };

    Ok(LaunchPlan {
        mode,
        data_dir: app.path().app_data_dir()?,
    })
}

/// Report a startup failure, then stop the backend and quit once dismissed.
fn fail_startup(app: &AppHandle, message: String) {
    log::error!("[Host] Startup failed: {}", message);
    let handle = app.clone();
    app.dialog()
        .message(message)
        .title("Backend Error")
        .kind(MessageDialogKind::Error)
        .show(move |_| {
            if let Some(supervisor) = handle.try_state::<Arc<ProcessSupervisor>>() {
                supervisor.stop();
            }
            handle.exit(1);
        });
}

/// Stop the backend and exit when the host itself is told to terminate.
#[cfg(any(unix, windows))]
async fn exit_on_signal(app: AppHandle, supervisor: Arc<ProcessSupervisor>) {
    match bossagent_core::ShutdownSignals::install() {
        Ok(signals) => {
            bossagent_core::stop_on_signal(signals, supervisor).await;
            app.exit(0);
        }
        Err(e) => log::warn!("[Host] Could not install signal handlers: {}", e),
    }
}

/// Gate the UI on backend health. No window exists until the backend is live.
async fn open_when_healthy(app: AppHandle, config: HostConfig) {
    let gate = HealthGate::new(config.port);
    if let Err(e) = gate.wait_until_healthy(config.timeouts.startup()).await {
        fail_startup(&app, e.to_string());
        return;
    }

    let client = BackendClient::new(config.base_url(), config.timeouts);
    let session = ClientSession::new(client, Arc::new(WebviewSink::new(app.clone()))).spawn();
    app.manage(HostBridge::new(
        BridgeConfig::from_host(&config),
        DialogPicker::new(app.clone()),
    ));
    app.manage(session);

    let window = WebviewWindowBuilder::new(&app, MAIN_WINDOW, WebviewUrl::App("index.html".into()))
        .title("BossAgent")
        .inner_size(1200.0, 760.0)
        .min_inner_size(900.0, 600.0)
        .build();
    match window {
        Ok(_) => log::info!("[Host] Main window opened"),
        Err(e) => fail_startup(&app, format!("Failed to open main window: {}", e)),
    }
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .setup(|app| {
            let level = if cfg!(debug_assertions) {
                log::LevelFilter::Info
            } else {
                log::LevelFilter::Warn
            };
            app.handle()
                .plugin(tauri_plugin_log::Builder::default().level(level).build())?;

            let config = HostConfig::from_env();
            let plan = match launch_plan(app.handle(), &config) {
                Ok(plan) => plan,
                Err(e) => {
                    fail_startup(app.handle(), format!("Failed to resolve app paths: {}", e));
                    return Ok(());
                }
            };
            let supervisor = Arc::new(ProcessSupervisor::new(plan));
            app.manage(supervisor.clone());

            if let Err(e) = supervisor.start(config.port) {
                fail_startup(app.handle(), e.to_string());
                return Ok(());
            }

            #[cfg(any(unix, windows))]
            tauri::async_runtime::spawn(exit_on_signal(app.handle().clone(), supervisor.clone()));
            tauri::async_runtime::spawn(open_when_healthy(app.handle().clone(), config));
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::bridge::bridge_config,
            commands::bridge::select_directory,
            commands::session::view_snapshot,
            commands::session::send_message,
            commands::session::send_nudge,
            commands::session::save_config,
            commands::session::clear_history,
        ])
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|app_handle, event| {
            if let RunEvent::Exit = event {
                // Never leave the backend orphaned
                log::info!("App shutting down - stopping backend");
                if let Some(supervisor) = app_handle.try_state::<Arc<ProcessSupervisor>>() {
                    supervisor.stop();
                }
            }
        });
}
