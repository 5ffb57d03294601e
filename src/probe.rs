//! Endpoint probing: the [`Prober`] trait, the HTTP implementation, and
//! the concurrent reachability fan-out.

use crate::error::MonitorError;
use async_trait::async_trait;
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Issues a single probe against one endpoint and reports the round-trip
/// time in milliseconds.
#[async_trait]
pub trait Prober: Send + Sync + std::fmt::Debug {
    async fn probe(&self, url: &str) -> Result<u64, MonitorError>;
}

/// HTTP GET prober backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    pub fn new(timeout: Duration) -> Result<Self, MonitorError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, url: &str) -> Result<u64, MonitorError> {
        let started = Instant::now();
        // Any response, error status included, proves the network path
        // works, so the status code is deliberately ignored.
        self.client.get(url).send().await?;
        Ok(started.elapsed().as_millis() as u64)
    }
}

/// Outcome of one probe within a reachability round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub endpoint: String,
    pub latency_ms: Option<u64>,
    pub success: bool,
    /// When the round this probe belongs to was issued.
    pub issued_at_ms: u64,
    /// Failure reason, present iff `success` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

/// One completed reachability round across all configured endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReachabilityReport {
    pub issued_at_ms: u64,
    pub results: Vec<ProbeResult>,
    /// True if at least one endpoint answered.
    pub reachable: bool,
}

/// Probe every endpoint concurrently and wait for all of them.
///
/// A single responding endpoint makes the round reachable; individual
/// failures are folded into their [`ProbeResult`] and never abort the
/// round.
pub async fn check_reachability(
    prober: &dyn Prober,
    endpoints: &[String],
    issued_at_ms: u64,
) -> ReachabilityReport {
    let probes = endpoints.iter().map(|endpoint| async move {
        match prober.probe(endpoint).await {
            Ok(latency_ms) => ProbeResult {
                endpoint: endpoint.clone(),
                latency_ms: Some(latency_ms),
                success: true,
                issued_at_ms,
                failure: None,
            },
            Err(err) => ProbeResult {
                endpoint: endpoint.clone(),
                latency_ms: None,
                success: false,
                issued_at_ms,
                failure: Some(err.to_string()),
            },
        }
    });

    let results = join_all(probes).await;
    let reachable = results.iter().any(|r| r.success);

    ReachabilityReport {
        issued_at_ms,
        results,
        reachable,
    }
}
