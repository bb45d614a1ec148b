use thiserror::Error;

/// Errors raised by the host while booting or talking to the backend.
///
/// `Launch`, `AlreadyRunning` and `HealthTimeout` belong to the bootstrap
/// phase and abort startup. Everything else is recovered locally: polling
/// retries on the next tick and user actions report back to their caller.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to launch backend '{command}': {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("backend is already running (pid {pid})")]
    AlreadyRunning { pid: u32 },

    #[error("backend did not respond at {url} within {timeout_ms} ms")]
    HealthTimeout { url: String, timeout_ms: u64 },

    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {path} failed with status {status}")]
    Status { path: String, status: u16 },

    #[error("client session has stopped")]
    SessionClosed,
}

impl HostError {
    /// True for failures that must stop the host before the UI exists.
    pub fn is_bootstrap(&self) -> bool {
        matches!(
            self,
            HostError::Launch { .. } | HostError::AlreadyRunning { .. } | HostError::HealthTimeout { .. }
        )
    }
}

pub type HostResult<T> = Result<T, HostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_errors_are_fatal() {
        let launch = HostError::Launch {
            command: "python3".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        let timeout = HostError::HealthTimeout {
            url: "http://127.0.0.1:8765/health".to_string(),
            timeout_ms: 30_000,
        };
        assert!(launch.is_bootstrap());
        assert!(timeout.is_bootstrap());
        assert!(HostError::AlreadyRunning { pid: 42 }.is_bootstrap());
    }

    #[test]
    fn request_errors_are_recoverable() {
        let status = HostError::Status {
            path: "/events".to_string(),
            status: 502,
        };
        assert!(!status.is_bootstrap());
        assert!(!HostError::SessionClosed.is_bootstrap());
        assert_eq!(status.to_string(), "request to /events failed with status 502");
    }
}
