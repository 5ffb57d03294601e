//! The reconciliation core: one state machine that absorbs reachability
//! rounds, quality bursts, and native connectivity signals, and keeps the
//! derived state (uptime, series, logs, quality figures) consistent.
//!
//! All mutation funnels through [`EngineState::apply_connectivity`], so a
//! genuine edge produces exactly one connection log entry no matter how
//! many sources assert the same status.

use crate::config::MonitorConfig;
use crate::logs::{ConnectionLog, ConnectionLogEntry, ConnectionStatus, DebugLog, DebugLogEntry};
use crate::probe::ReachabilityReport;
use crate::quality::{BurstReport, QualityMetrics};
use crate::series::{LatencyHistory, LatencySample};
use crate::snapshot::StatusSnapshot;
use crate::uptime::UptimeClock;
use tracing::{debug, info, warn};

/// Where a connectivity assertion came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalSource {
    /// The host platform's own online/offline notification.
    Native,
    /// The outcome of a reachability round.
    Probe,
}

/// Aggregate monitor state. Not thread-safe on its own; the monitor wraps
/// it in a lock and applies events from a single task.
#[derive(Debug)]
pub struct EngineState {
    online: bool,
    uptime: UptimeClock,
    history: LatencyHistory,
    connection_log: ConnectionLog,
    debug_log: DebugLog,
    quality: QualityMetrics,
    last_reachability_ms: Option<u64>,
    last_quality_ms: Option<u64>,
}

impl EngineState {
    /// Initial state. The starting status comes from configuration, not
    /// from a probe, so no transition is logged for it.
    pub fn new(config: &MonitorConfig, now_ms: u64) -> Self {
        let mut uptime = UptimeClock::default();
        if config.assume_online {
            uptime.start(now_ms);
        }
        Self {
            online: config.assume_online,
            uptime,
            history: LatencyHistory::new(config.window_ms),
            connection_log: ConnectionLog::new(),
            debug_log: DebugLog::new(),
            quality: QualityMetrics::default(),
            last_reachability_ms: None,
            last_quality_ms: None,
        }
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Assert the connectivity status from some source. Re-asserting the
    /// current status is a no-op; a genuine edge runs the transition
    /// actions and logs exactly one entry. Returns whether an edge
    /// occurred.
    pub fn apply_connectivity(
        &mut self,
        online: bool,
        source: SignalSource,
        now_ms: u64,
    ) -> bool {
        if online == self.online {
            return false;
        }
        self.online = online;

        if online {
            self.uptime.start(now_ms);
            self.connection_log.record(ConnectionLogEntry {
                timestamp_ms: now_ms,
                status: ConnectionStatus::Connected,
                session_uptime: None,
            });
            info!("Connection restored ({source:?} signal)");
        } else {
            self.uptime.stop(now_ms);
            let label = self.uptime.label(now_ms);
            self.connection_log.record(ConnectionLogEntry {
                timestamp_ms: now_ms,
                status: ConnectionStatus::Disconnected,
                session_uptime: Some(label.clone()),
            });
            info!("Connection lost ({source:?} signal) after {label}");
        }
        true
    }

    /// Absorb one reachability round: record per-endpoint samples and
    /// debug messages, then route the aggregate through the transition
    /// path. Rounds issued before the last applied one are discarded.
    /// Returns whether the round was applied.
    pub fn apply_reachability(&mut self, report: &ReachabilityReport, now_ms: u64) -> bool {
        if let Some(last) = self.last_reachability_ms {
            if report.issued_at_ms < last {
                debug!(
                    "Discarding stale reachability round issued at {}ms",
                    report.issued_at_ms
                );
                return false;
            }
        }
        self.last_reachability_ms = Some(report.issued_at_ms);

        for result in &report.results {
            match result.latency_ms {
                Some(latency_ms) if result.success => {
                    self.history.insert(LatencySample {
                        endpoint: result.endpoint.clone(),
                        latency_ms,
                        timestamp_ms: now_ms,
                    });
                    self.record_debug(
                        format!("Connected to {} ({latency_ms}ms)", result.endpoint),
                        now_ms,
                    );
                }
                _ => {
                    let reason = result.failure.as_deref().unwrap_or("unknown error");
                    self.record_debug(
                        format!("Failed to connect to {}: {reason}", result.endpoint),
                        now_ms,
                    );
                }
            }
        }

        self.apply_connectivity(report.reachable, SignalSource::Probe, now_ms);
        true
    }

    /// Absorb one quality burst. Fresh metrics replace the previous ones
    /// wholesale; a fully failed burst keeps the old figures and leaves a
    /// debug message instead. Stale bursts are discarded. Returns whether
    /// the burst was applied.
    pub fn apply_quality(&mut self, report: &BurstReport, now_ms: u64) -> bool {
        if let Some(last) = self.last_quality_ms {
            if report.issued_at_ms < last {
                debug!(
                    "Discarding stale quality burst issued at {}ms",
                    report.issued_at_ms
                );
                return false;
            }
        }
        self.last_quality_ms = Some(report.issued_at_ms);

        for result in &report.results {
            if let (true, Some(latency_ms)) = (result.success, result.latency_ms) {
                self.history.insert(LatencySample {
                    endpoint: report.endpoint.clone(),
                    latency_ms,
                    timestamp_ms: now_ms,
                });
            }
        }

        match report.metrics {
            Some(metrics) => self.quality = metrics,
            None => {
                warn!(
                    "Quality burst to {} failed on all {} probes",
                    report.endpoint,
                    report.results.len()
                );
                let mut message = format!("Quality burst to {} failed:", report.endpoint);
                for (i, result) in report.results.iter().enumerate() {
                    let reason = result.failure.as_deref().unwrap_or("unknown error");
                    message.push_str(&format!("\n  probe {}: {reason}", i + 1));
                }
                self.record_debug(message, now_ms);
            }
        }
        true
    }

    /// Append a diagnostic message to the rolling debug log.
    pub fn record_debug(&mut self, message: String, now_ms: u64) {
        self.debug_log.record(DebugLogEntry {
            timestamp_ms: now_ms,
            message,
        });
    }

    /// Drop every retained latency sample. Logs and quality figures are
    /// untouched.
    pub fn clear_latency_history(&mut self) {
        self.history.clear();
    }

    /// Flip the debug log between its live and frozen views. Returns the
    /// new expanded state.
    pub fn toggle_debug_expanded(&mut self) -> bool {
        self.debug_log.toggle_expanded()
    }

    /// Consistent copy of everything a consumer renders.
    pub fn snapshot(&self, now_ms: u64) -> StatusSnapshot {
        StatusSnapshot {
            timestamp_ms: now_ms,
            is_online: self.online,
            uptime_label: self.uptime.label(now_ms),
            jitter_ms: self.quality.jitter_ms,
            packet_loss_percent: self.quality.packet_loss_percent,
            latency_series: self.history.window().to_vec(),
            connection_log: self.connection_log.to_vec(),
            debug_log: self.debug_log.visible(),
            debug_expanded: self.debug_log.is_expanded(),
        }
    }
}
