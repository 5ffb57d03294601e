//! Monitor configuration.
//!
//! Defaults work unattended: three well-known probe hosts, a 30 second
//! latency window, five-probe bursts with a 200 ms threshold, and
//! one-second cadences for both tick kinds.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::MonitorError;

/// Configuration for a [`Monitor`](crate::Monitor).
///
/// Every field can be overridden by the host. A subset can also be loaded
/// from a TOML file via [`MonitorConfig::from_file`], with unspecified
/// fields falling back to the defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Reachability probe targets. The engine infers "online" if any one
    /// of them answers within a tick.
    pub endpoints: Vec<String>,

    /// Quality-burst target. A small static asset keeps transfer time out
    /// of the latency signal.
    pub quality_endpoint: String,

    /// Latency sample retention window in milliseconds.
    pub window_ms: u64,

    /// Probes per quality burst.
    pub burst_size: usize,

    /// Latency threshold in milliseconds for the heuristic loss figure.
    pub burst_latency_threshold_ms: u64,

    /// Cadence of reachability ticks in milliseconds.
    pub reachability_interval_ms: u64,

    /// Cadence of quality-burst ticks in milliseconds.
    pub quality_interval_ms: u64,

    /// Per-probe HTTP timeout in milliseconds.
    pub probe_timeout_ms: u64,

    /// Connectivity assumed at startup, i.e. the native flag sampled by
    /// the host. The initial state produces no connection log entry.
    pub assume_online: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            endpoints: vec![
                "https://www.google.com/favicon.ico".to_string(),
                "https://www.cloudflare.com/favicon.ico".to_string(),
                "https://www.microsoft.com/favicon.ico".to_string(),
            ],
            quality_endpoint: "https://www.cloudflare.com/favicon.ico".to_string(),
            window_ms: 30_000,
            burst_size: 5,
            burst_latency_threshold_ms: 200,
            reachability_interval_ms: 1_000,
            quality_interval_ms: 1_000,
            probe_timeout_ms: 5_000,
            assume_online: true,
        }
    }
}

impl MonitorConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, MonitorError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Toml))
            .build()
            .map_err(|e| MonitorError::Config(e.to_string()))?;

        let config: MonitorConfig = settings
            .try_deserialize()
            .map_err(|e| MonitorError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can drive the engine.
    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.endpoints.is_empty() {
            return Err(MonitorError::Config(
                "at least one reachability endpoint is required".to_string(),
            ));
        }
        if self.quality_endpoint.is_empty() {
            return Err(MonitorError::Config(
                "a quality endpoint is required".to_string(),
            ));
        }
        if self.burst_size == 0 {
            return Err(MonitorError::Config(
                "burst_size must be at least 1".to_string(),
            ));
        }
        if self.reachability_interval_ms == 0 || self.quality_interval_ms == 0 {
            return Err(MonitorError::Config(
                "tick intervals must be non-zero".to_string(),
            ));
        }
        if self.window_ms == 0 {
            return Err(MonitorError::Config(
                "window_ms must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub(crate) fn reachability_interval(&self) -> Duration {
        Duration::from_millis(self.reachability_interval_ms)
    }

    pub(crate) fn quality_interval(&self) -> Duration {
        Duration::from_millis(self.quality_interval_ms)
    }
}
