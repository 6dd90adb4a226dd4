//! Probe variants — one `run()` per configured target per tick.

use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::evaluate;
use crate::metrics::{Metric, MetricSource};
use crate::models::{CheckResult, Outcome};

/// A configured unit of measurement. Every variant produces exactly one
/// `CheckResult` per invocation; the only error a probe may propagate
/// is a resource probe's platform read failure.
#[derive(Clone)]
pub enum Probe {
    Http(HttpProbe),
    Resource(ResourceProbe),
}

impl Probe {
    pub fn name(&self) -> &str {
        match self {
            Probe::Http(p) => &p.name,
            Probe::Resource(p) => &p.name,
        }
    }

    pub async fn run(&self) -> Result<CheckResult> {
        match self {
            Probe::Http(p) => Ok(p.measure().await),
            Probe::Resource(p) => p.measure().await,
        }
    }
}

/// Checks that a GET against `url` answers with `expected_status`
/// within `timeout`.
#[derive(Clone)]
pub struct HttpProbe {
    pub name: String,
    pub url: String,
    pub expected_status: u16,
    pub timeout: Duration,
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        expected_status: u16,
        timeout: Duration,
        client: reqwest::Client,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            expected_status,
            timeout,
            client,
        }
    }

    /// All failure modes become `Outcome` values; this never returns an
    /// error to the caller.
    pub async fn measure(&self) -> CheckResult {
        let timestamp = Utc::now();
        let started = Instant::now();
        let response = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await;

        match response {
            Ok(resp) => {
                let elapsed = started.elapsed().as_secs_f64();
                let observed = resp.status().as_u16();
                let outcome = evaluate::classify_status(observed, self.expected_status);
                let detail = if outcome.is_ok() {
                    String::new()
                } else {
                    format!("status {}, expected {}", observed, self.expected_status)
                };
                CheckResult {
                    name: self.name.clone(),
                    outcome,
                    measured_value: Some(elapsed),
                    detail,
                    timestamp,
                }
            }
            Err(e) if e.is_timeout() => {
                debug!(probe = %self.name, url = %self.url, "request timed out");
                // Past the deadline the true elapsed time is unknown;
                // report the configured timeout.
                CheckResult {
                    name: self.name.clone(),
                    outcome: Outcome::Timeout,
                    measured_value: Some(self.timeout.as_secs_f64()),
                    detail: format!("no response within {:.0}s", self.timeout.as_secs_f64()),
                    timestamp,
                }
            }
            Err(e) if e.is_connect() => {
                debug!(probe = %self.name, url = %self.url, error = %e, "connection failed");
                CheckResult {
                    name: self.name.clone(),
                    outcome: Outcome::Unreachable,
                    measured_value: None,
                    detail: format!("{} unreachable", self.url),
                    timestamp,
                }
            }
            Err(e) => CheckResult {
                name: self.name.clone(),
                outcome: Outcome::InternalError,
                measured_value: None,
                detail: e.to_string(),
                timestamp,
            },
        }
    }
}

/// Compares one OS metric reading against a threshold.
#[derive(Clone)]
pub struct ResourceProbe {
    pub name: String,
    pub metric: Metric,
    pub threshold: f64,
    source: Arc<dyn MetricSource>,
}

impl ResourceProbe {
    pub fn new(
        name: impl Into<String>,
        metric: Metric,
        threshold: f64,
        source: Arc<dyn MetricSource>,
    ) -> Self {
        Self {
            name: name.into(),
            metric,
            threshold,
            source,
        }
    }

    /// Errors out only when the platform read itself fails; the caller
    /// decides how to handle a tick without this probe's result.
    pub async fn measure(&self) -> Result<CheckResult> {
        let timestamp = Utc::now();
        let source = Arc::clone(&self.source);
        let metric = self.metric;
        let sample = tokio::task::spawn_blocking(move || source.sample(metric)).await??;

        let outcome = evaluate::classify_threshold(sample.value, self.threshold);
        let detail = if outcome.is_ok() {
            sample.context
        } else if sample.context.is_empty() {
            format!("{:.1} exceeds threshold {:.0}", sample.value, self.threshold)
        } else {
            format!(
                "{:.1} exceeds threshold {:.0} | {}",
                sample.value, self.threshold, sample.context
            )
        };

        Ok(CheckResult {
            name: self.name.clone(),
            outcome,
            measured_value: Some(sample.value),
            detail,
            timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricSample;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// One-shot HTTP server that answers every connection with a fixed
    /// response and returns the address it listens on.
    async fn serve_fixed(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(async move {
                    let mut buf = [0u8; 1024];
                    let _ = stream.read(&mut buf).await;
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.flush().await;
                });
            }
        });
        format!("http://{}", addr)
    }

    fn http_probe(url: String, expected: u16, timeout: Duration) -> HttpProbe {
        HttpProbe::new("svc", url, expected, timeout, reqwest::Client::new())
    }

    #[tokio::test]
    async fn expected_status_is_ok_with_elapsed_time() {
        let url = serve_fixed("HTTP/1.1 200 OK\r\ncontent-length: 0\r\n\r\n").await;
        let probe = http_probe(url, 200, Duration::from_secs(5));

        let result = probe.measure().await;
        assert_eq!(result.outcome, Outcome::Ok);
        assert_eq!(result.name, "svc");
        assert!(result.detail.is_empty());
        let elapsed = result.measured_value.unwrap();
        assert!(elapsed > 0.0 && elapsed < 5.0);
    }

    #[tokio::test]
    async fn unexpected_status_carries_both_codes() {
        let url = serve_fixed("HTTP/1.1 503 Service Unavailable\r\ncontent-length: 0\r\n\r\n")
            .await;
        let probe = http_probe(url, 200, Duration::from_secs(5));

        let result = probe.measure().await;
        assert_eq!(result.outcome, Outcome::UnexpectedResponse);
        assert_eq!(result.detail, "status 503, expected 200");
        assert!(result.measured_value.is_some());
    }

    #[tokio::test]
    async fn connection_refused_is_unreachable() {
        // Bind then drop to get a port with nothing listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let probe = http_probe(format!("http://{}", addr), 200, Duration::from_secs(5));
        let result = probe.measure().await;
        assert_eq!(result.outcome, Outcome::Unreachable);
        assert!(result.measured_value.is_none());
    }

    #[tokio::test]
    async fn malformed_response_is_internal_error_with_error_text() {
        let url = serve_fixed("not an http response\r\n\r\n").await;
        let probe = http_probe(url, 200, Duration::from_secs(5));

        let result = probe.measure().await;
        assert_eq!(result.outcome, Outcome::InternalError);
        assert!(result.measured_value.is_none());
        assert!(!result.detail.is_empty());
    }

    #[tokio::test]
    async fn silent_server_is_timeout_with_configured_deadline() {
        // Accepts connections but never responds.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                // Hold the connection open without answering.
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    drop(stream);
                });
            }
        });

        let timeout = Duration::from_millis(300);
        let probe = http_probe(format!("http://{}", addr), 200, timeout);
        let result = probe.measure().await;
        assert_eq!(result.outcome, Outcome::Timeout);
        assert_eq!(result.measured_value, Some(timeout.as_secs_f64()));
    }

    struct FixedSource(f64);

    impl MetricSource for FixedSource {
        fn sample(&self, _metric: Metric) -> Result<MetricSample> {
            Ok(MetricSample::new(self.0))
        }
    }

    struct FailingSource;

    impl MetricSource for FailingSource {
        fn sample(&self, _metric: Metric) -> Result<MetricSample> {
            anyhow::bail!("platform read failed")
        }
    }

    #[tokio::test]
    async fn reading_above_threshold_alerts() {
        let probe = ResourceProbe::new(
            "CPU",
            Metric::CpuPercent,
            80.0,
            Arc::new(FixedSource(85.0)),
        );
        let result = probe.measure().await.unwrap();
        assert_eq!(result.outcome, Outcome::Alert);
        assert_eq!(result.measured_value, Some(85.0));
        assert!(result.detail.contains("85.0 exceeds threshold 80"));
    }

    #[tokio::test]
    async fn reading_at_threshold_is_ok() {
        let probe = ResourceProbe::new(
            "CPU",
            Metric::CpuPercent,
            80.0,
            Arc::new(FixedSource(80.0)),
        );
        let result = probe.measure().await.unwrap();
        assert_eq!(result.outcome, Outcome::Ok);
    }

    #[tokio::test]
    async fn platform_failure_propagates() {
        let probe = ResourceProbe::new(
            "Disk",
            Metric::DiskPercent,
            85.0,
            Arc::new(FailingSource),
        );
        let err = Probe::Resource(probe).run().await.unwrap_err();
        assert!(err.to_string().contains("platform read failed"));
    }
}
