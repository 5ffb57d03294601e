//! Connection quality: sequential probe bursts and the jitter / loss
//! figures derived from them.

use crate::probe::{ProbeResult, Prober};
use serde::{Deserialize, Serialize};

/// Jitter and loss computed from one probe burst.
///
/// The loss figure is a heuristic: it counts probes that failed or came
/// back slower than the configured threshold, not true packet drops.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Mean absolute difference between consecutive round-trip times.
    pub jitter_ms: f64,
    /// Share of burst probes that failed or exceeded the threshold.
    pub packet_loss_percent: u8,
    pub computed_at_ms: u64,
}

/// One completed quality burst against the quality endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurstReport {
    pub issued_at_ms: u64,
    pub endpoint: String,
    pub results: Vec<ProbeResult>,
    /// Absent when every probe in the burst failed.
    pub metrics: Option<QualityMetrics>,
}

/// Run `burst_size` probes back to back against one endpoint.
///
/// The probes are sequential on purpose: overlapping them would distort
/// the consecutive-difference jitter. Metrics are computed whenever at
/// least one probe succeeds; a fully failed burst yields `None`.
pub async fn measure_burst(
    prober: &dyn Prober,
    endpoint: &str,
    burst_size: usize,
    threshold_ms: u64,
    issued_at_ms: u64,
) -> BurstReport {
    let mut results = Vec::with_capacity(burst_size);
    for _ in 0..burst_size {
        let result = match prober.probe(endpoint).await {
            Ok(latency_ms) => ProbeResult {
                endpoint: endpoint.to_string(),
                latency_ms: Some(latency_ms),
                success: true,
                issued_at_ms,
                failure: None,
            },
            Err(err) => ProbeResult {
                endpoint: endpoint.to_string(),
                latency_ms: None,
                success: false,
                issued_at_ms,
                failure: Some(err.to_string()),
            },
        };
        results.push(result);
    }

    let successes: Vec<u64> = results.iter().filter_map(|r| r.latency_ms).collect();
    let metrics = if successes.is_empty() {
        None
    } else {
        let outcomes: Vec<Option<u64>> = results.iter().map(|r| r.latency_ms).collect();
        Some(QualityMetrics {
            jitter_ms: jitter(&successes),
            packet_loss_percent: loss_percent(&outcomes, threshold_ms),
            computed_at_ms: issued_at_ms,
        })
    };

    BurstReport {
        issued_at_ms,
        endpoint: endpoint.to_string(),
        results,
        metrics,
    }
}

/// Mean absolute difference between consecutive latencies, in the order
/// they were measured. Zero when fewer than two values are available.
pub fn jitter(latencies: &[u64]) -> f64 {
    if latencies.len() < 2 {
        return 0.0;
    }
    let total: u64 = latencies.windows(2).map(|w| w[0].abs_diff(w[1])).sum();
    total as f64 / (latencies.len() - 1) as f64
}

/// Percentage of burst probes that failed outright or exceeded the
/// latency threshold, rounded to the nearest whole percent.
pub fn loss_percent(outcomes: &[Option<u64>], threshold_ms: u64) -> u8 {
    if outcomes.is_empty() {
        return 0;
    }
    let over = outcomes
        .iter()
        .filter(|outcome| match outcome {
            Some(latency) => *latency > threshold_ms,
            None => true,
        })
        .count();
    ((over as f64 / outcomes.len() as f64) * 100.0).round() as u8
}
