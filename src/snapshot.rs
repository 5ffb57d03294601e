//! Point-in-time view of everything the monitor knows.

use crate::logs::{ConnectionLogEntry, DebugLogEntry};
use crate::series::LatencySample;
use serde::{Deserialize, Serialize};

/// A consistent snapshot of monitor state, taken under one lock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// When the snapshot was taken.
    pub timestamp_ms: u64,
    pub is_online: bool,
    /// Human-readable uptime of the current or last session.
    pub uptime_label: String,
    pub jitter_ms: f64,
    pub packet_loss_percent: u8,
    /// Latency samples still inside the sliding window, oldest first.
    pub latency_series: Vec<LatencySample>,
    /// Connectivity transitions, newest first.
    pub connection_log: Vec<ConnectionLogEntry>,
    /// Diagnostic messages as currently visible, oldest first.
    pub debug_log: Vec<DebugLogEntry>,
    pub debug_expanded: bool,
}

/// Milliseconds since the Unix epoch.
pub(crate) fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
