//! Health gate
//! Blocks UI creation until the backend answers its liveness endpoint.
//!
//! Fixed-interval probing, no backoff: backend startup is short and bounded,
//! so a constant interval adds the least latency. Any non-200 outcome is
//! retried the same way as a refused connection.

use std::time::Duration;
use tokio::time::Instant;

use crate::config::BACKEND_HOST;
use crate::error::{HostError, HostResult};
use crate::models::HealthStatus;

pub const HEALTH_PATH: &str = "/health";
pub const PROBE_INTERVAL: Duration = Duration::from_millis(300);

/// States of the bounded retry loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Probing,
    Succeeded,
    TimedOut,
}

/// Single transition rule, applied after each probe.
pub fn next_state(status: HealthStatus, elapsed: Duration, timeout: Duration) -> GateState {
    if status.is_live() {
        GateState::Succeeded
    } else if elapsed > timeout {
        GateState::TimedOut
    } else {
        GateState::Probing
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateReport {
    pub attempts: u32,
    pub elapsed: Duration,
}

pub struct HealthGate {
    client: reqwest::Client,
    url: String,
    interval: Duration,
}

impl HealthGate {
    pub fn new(port: u16) -> Self {
        Self::for_base_url(&format!("http://{}:{}", BACKEND_HOST, port))
    }

    pub fn for_base_url(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!("{}{}", base_url.trim_end_matches('/'), HEALTH_PATH),
            interval: PROBE_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// One GET against the liveness endpoint, bounded by `budget`.
    pub async fn probe(&self, budget: Duration) -> HealthStatus {
        match self.client.get(&self.url).timeout(budget).send().await {
            Ok(response) => HealthStatus::responded(response.status().as_u16()),
            Err(_) => HealthStatus::unreachable(),
        }
    }

    /// Probe every interval until the backend is live or `timeout` has
    /// elapsed since the first attempt.
    pub async fn wait_until_healthy(&self, timeout: Duration) -> HostResult<GateReport> {
        let started = Instant::now();
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let budget = timeout.saturating_sub(started.elapsed()).max(self.interval);
            let status = self.probe(budget).await;
            let elapsed = started.elapsed();

            match next_state(status, elapsed, timeout) {
                GateState::Succeeded => {
                    log::info!(
                        "[HealthGate] Backend live at {} after {} probe(s), {:?}",
                        self.url,
                        attempts,
                        elapsed
                    );
                    return Ok(GateReport { attempts, elapsed });
                }
                GateState::TimedOut => {
                    log::warn!(
                        "[HealthGate] Backend at {} not live after {} probe(s)",
                        self.url,
                        attempts
                    );
                    return Err(HostError::HealthTimeout {
                        url: self.url.clone(),
                        timeout_ms: timeout.as_millis() as u64,
                    });
                }
                GateState::Probing => {
                    log::debug!("[HealthGate] Probe {} failed: {:?}", attempts, status.http_status);
                    tokio::time::sleep(self.interval).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FAST: Duration = Duration::from_millis(40);

    #[test]
    fn transition_rule() {
        let timeout = Duration::from_secs(1);
        let live = HealthStatus::responded(200);
        let down = HealthStatus::unreachable();
        let unhealthy = HealthStatus::responded(503);

        assert_eq!(next_state(live, Duration::from_secs(5), timeout), GateState::Succeeded);
        assert_eq!(next_state(down, Duration::from_millis(10), timeout), GateState::Probing);
        assert_eq!(next_state(unhealthy, timeout, timeout), GateState::Probing);
        assert_eq!(next_state(unhealthy, Duration::from_millis(1001), timeout), GateState::TimedOut);
    }

    #[tokio::test]
    async fn succeeds_on_first_live_probe() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"status":"ok"}"#))
            .expect(1)
            .mount(&server)
            .await;

        let gate = HealthGate::for_base_url(&server.uri()).with_interval(FAST);
        let report = gate.wait_until_healthy(Duration::from_secs(2)).await.unwrap();
        assert_eq!(report.attempts, 1);
    }

    #[tokio::test]
    async fn succeeds_after_exactly_n_probes() {
        let server = MockServer::start().await;
        let attempt = AtomicU32::new(0);
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(move |_: &wiremock::Request| {
                if attempt.fetch_add(1, Ordering::SeqCst) < 2 {
                    ResponseTemplate::new(503)
                } else {
                    ResponseTemplate::new(200)
                }
            })
            .expect(3)
            .mount(&server)
            .await;

        let gate = HealthGate::for_base_url(&server.uri()).with_interval(FAST);
        let report = gate.wait_until_healthy(Duration::from_secs(5)).await.unwrap();
        assert_eq!(report.attempts, 3);
        assert!(report.elapsed >= FAST * 2);
    }

    #[tokio::test]
    async fn unhealthy_status_times_out_no_earlier_than_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let timeout = Duration::from_millis(250);
        let gate = HealthGate::for_base_url(&server.uri()).with_interval(FAST);
        let started = std::time::Instant::now();
        let err = gate.wait_until_healthy(timeout).await.unwrap_err();

        assert!(started.elapsed() >= timeout);
        match err {
            HostError::HealthTimeout { url, timeout_ms } => {
                assert_eq!(url, format!("{}/health", server.uri()));
                assert_eq!(timeout_ms, 250);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn refused_connection_is_retried_until_timeout() {
        // Grab a free port, then release it so nothing listens there
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let timeout = Duration::from_millis(200);
        let gate = HealthGate::new(port).with_interval(FAST);
        assert_eq!(gate.url(), format!("http://127.0.0.1:{}/health", port));

        let started = std::time::Instant::now();
        let err = gate.wait_until_healthy(timeout).await.unwrap_err();
        assert!(started.elapsed() >= timeout);
        assert!(matches!(err, HostError::HealthTimeout { .. }));
    }
}
