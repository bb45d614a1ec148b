//! Host configuration
//! Resolved once at boot from the environment, with fallbacks for anything
//! missing or unparseable.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8765;
pub const BACKEND_HOST: &str = "127.0.0.1";

pub const DEFAULT_STARTUP_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 12_000;
pub const DEFAULT_EVENTS_TIMEOUT_MS: u64 = 8_000;
pub const DEFAULT_STREAM_TIMEOUT_MS: u64 = 150_000;

pub const ENV_BACKEND_PORT: &str = "BOSS_BACKEND_PORT";
pub const ENV_PYTHON: &str = "BOSS_PYTHON";
pub const ENV_SERVER_SCRIPT: &str = "BOSS_SERVER_SCRIPT";
pub const ENV_STARTUP_TIMEOUT_MS: &str = "BOSS_STARTUP_TIMEOUT_MS";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "BOSS_REQUEST_TIMEOUT_MS";
pub const ENV_EVENTS_TIMEOUT_MS: &str = "BOSS_EVENTS_TIMEOUT_MS";
pub const ENV_STREAM_TIMEOUT_MS: &str = "BOSS_STREAM_TIMEOUT_MS";

/// Per-call timeouts, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeouts {
    pub startup_ms: u64,
    pub request_ms: u64,
    pub events_ms: u64,
    pub stream_ms: u64,
}

impl Timeouts {
    pub fn startup(&self) -> Duration {
        Duration::from_millis(self.startup_ms)
    }

    pub fn request(&self) -> Duration {
        Duration::from_millis(self.request_ms)
    }

    pub fn events(&self) -> Duration {
        Duration::from_millis(self.events_ms)
    }

    pub fn stream(&self) -> Duration {
        Duration::from_millis(self.stream_ms)
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            startup_ms: DEFAULT_STARTUP_TIMEOUT_MS,
            request_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            events_ms: DEFAULT_EVENTS_TIMEOUT_MS,
            stream_ms: DEFAULT_STREAM_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    pub port: u16,
    /// Interpreter used when the backend runs from its script.
    pub interpreter: Option<String>,
    /// Script path override for unpackaged runs.
    pub server_script: Option<PathBuf>,
    pub timeouts: Timeouts,
}

impl HostConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup(ENV_BACKEND_PORT)
            .and_then(|raw| raw.trim().parse::<u16>().ok())
            .filter(|port| *port != 0)
            .unwrap_or(DEFAULT_PORT);

        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            port,
            interpreter: non_empty(ENV_PYTHON),
            server_script: non_empty(ENV_SERVER_SCRIPT).map(PathBuf::from),
            timeouts: Timeouts {
                startup_ms: parse_millis(lookup(ENV_STARTUP_TIMEOUT_MS), DEFAULT_STARTUP_TIMEOUT_MS),
                request_ms: parse_millis(lookup(ENV_REQUEST_TIMEOUT_MS), DEFAULT_REQUEST_TIMEOUT_MS),
                events_ms: parse_millis(lookup(ENV_EVENTS_TIMEOUT_MS), DEFAULT_EVENTS_TIMEOUT_MS),
                stream_ms: parse_millis(lookup(ENV_STREAM_TIMEOUT_MS), DEFAULT_STREAM_TIMEOUT_MS),
            },
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", BACKEND_HOST, self.port)
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// Parse a millisecond value, accepting any finite non-negative number.
fn parse_millis(raw: Option<String>, fallback: u64) -> u64 {
    raw.and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite() && *value >= 0.0)
        .map(|value| value as u64)
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> HostConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        HostConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = config_from(&[]);
        assert_eq!(config.port, 8765);
        assert_eq!(config.interpreter, None);
        assert_eq!(config.timeouts, Timeouts::default());
        assert_eq!(config.timeouts.startup(), Duration::from_secs(30));
        assert_eq!(config.base_url(), "http://127.0.0.1:8765");
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            (ENV_BACKEND_PORT, "9100"),
            (ENV_PYTHON, "/opt/py/bin/python"),
            (ENV_STARTUP_TIMEOUT_MS, "5000"),
            (ENV_EVENTS_TIMEOUT_MS, "2500.9"),
        ]);
        assert_eq!(config.port, 9100);
        assert_eq!(config.interpreter.as_deref(), Some("/opt/py/bin/python"));
        assert_eq!(config.timeouts.startup_ms, 5000);
        assert_eq!(config.timeouts.events_ms, 2500);
        assert_eq!(config.timeouts.request_ms, DEFAULT_REQUEST_TIMEOUT_MS);
        assert_eq!(config.base_url(), "http://127.0.0.1:9100");
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = config_from(&[
            (ENV_BACKEND_PORT, "not-a-port"),
            (ENV_PYTHON, "   "),
            (ENV_REQUEST_TIMEOUT_MS, "soon"),
            (ENV_STREAM_TIMEOUT_MS, "-1"),
            (ENV_STARTUP_TIMEOUT_MS, "inf"),
        ]);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.interpreter, None);
        assert_eq!(config.timeouts, Timeouts::default());
    }
}
