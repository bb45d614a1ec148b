//! BossAgent host core
//! Supervises the local backend, gates the UI on its health endpoint and
//! keeps the client view in sync with backend-owned state.
//!
//! Module structure:
//! - services: supervisor, health gate, HTTP client, poll tick, client session,
//!   termination signals
//! - models: wire types shared with the backend
//! - bridge: the capabilities the UI layer is allowed to request
//! - timer: pure projection of scheduler snapshots into display state
//! - view: the view model rendered by the webview

pub mod bridge;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod timer;
pub mod view;

pub use bridge::{BridgeConfig, DirectoryPicker, HostBridge};
pub use config::{HostConfig, Timeouts};
pub use error::{HostError, HostResult};
pub use services::{
    BackendClient, BackendInfo, ClientSession, GateReport, HealthGate, LaunchMode, LaunchPlan,
    ProcessSupervisor, SessionHandle, ViewSink,
};
#[cfg(any(unix, windows))]
pub use services::{stop_on_signal, ShutdownSignals};
pub use timer::TimerDisplay;
pub use view::ClientView;
