//! A terminating host stops its backend before it goes.

#![cfg(unix)]

use std::sync::Arc;
use std::time::Duration;

use bossagent_core::{stop_on_signal, LaunchMode, LaunchPlan, ProcessSupervisor, ShutdownSignals};

#[tokio::test]
async fn sigterm_to_host_stops_backend() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("backend.sh");
    std::fs::write(&script, "exec sleep 30\n").unwrap();
    let supervisor = Arc::new(ProcessSupervisor::new(LaunchPlan {
        mode: LaunchMode::Script {
            interpreter: Some("sh".to_string()),
            script,
        },
        data_dir: dir.path().join("data"),
    }));
    let backend_pid = supervisor.start(8765).unwrap().pid;

    let signals = ShutdownSignals::install().unwrap();
    let waiter = tokio::spawn(stop_on_signal(signals, supervisor.clone()));

    // The backend has its own process group, so only the host is signalled
    unsafe {
        libc::kill(libc::getpid(), libc::SIGTERM);
    }

    let signal = tokio::time::timeout(Duration::from_secs(5), waiter)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(signal, "SIGTERM");
    assert!(!supervisor.is_running());
    assert_ne!(unsafe { libc::kill(backend_pid as i32, 0) }, 0);
}
