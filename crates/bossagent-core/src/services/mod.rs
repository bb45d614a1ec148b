//! Services module
//! Backend lifecycle, health gating and the polling client session.
//! Kept free of any UI toolkit so it runs headless under test.

pub mod api;
pub mod health;
pub mod poll;
pub mod session;
#[cfg(any(unix, windows))]
pub mod shutdown;
pub mod supervisor;

pub use api::BackendClient;
pub use health::{next_state, GateReport, GateState, HealthGate, PROBE_INTERVAL};
pub use poll::{fetch_tick, TickOutcome, POLL_INTERVAL};
pub use session::{ClientSession, SessionHandle, ViewSink};
#[cfg(any(unix, windows))]
pub use shutdown::{stop_on_signal, ShutdownSignals};
pub use supervisor::{BackendInfo, LaunchMode, LaunchPlan, LaunchSpec, ProcessSupervisor};
