//! The monitor runtime: interval tickers that issue probe rounds, a
//! single applier task that owns every state mutation, and the handle
//! consumers use to read snapshots and feed native connectivity signals.
//!
//! Probe work runs in detached per-tick tasks, so a slow or wedged round
//! never delays the next tick. Results funnel through one channel into
//! the applier, which serializes mutations; rounds that arrive out of
//! order are discarded by the engine's staleness check.

use crate::config::MonitorConfig;
use crate::engine::{EngineState, SignalSource};
use crate::error::MonitorError;
use crate::probe::{check_reachability, HttpProber, Prober, ReachabilityReport};
use crate::quality::{measure_burst, BurstReport};
use crate::snapshot::{now_ms, StatusSnapshot};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::info;

#[derive(Debug)]
enum EngineEvent {
    Reachability(ReachabilityReport),
    Quality(BurstReport),
    Native { online: bool },
    Fault { message: String },
}

/// Feeds the host platform's own online/offline notifications into the
/// monitor. Cheap to clone; signals sent after shutdown are dropped.
#[derive(Debug, Clone)]
pub struct NativeSignal {
    events: mpsc::UnboundedSender<EngineEvent>,
}

impl NativeSignal {
    pub fn online(&self) {
        let _ = self.events.send(EngineEvent::Native { online: true });
    }

    pub fn offline(&self) {
        let _ = self.events.send(EngineEvent::Native { online: false });
    }
}

/// Configures and starts a [`Monitor`].
#[derive(Debug, Default)]
pub struct MonitorBuilder {
    config: MonitorConfig,
    prober: Option<Arc<dyn Prober>>,
}

impl MonitorBuilder {
    /// Replace the whole configuration.
    pub fn config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    /// Endpoints probed by reachability rounds.
    pub fn endpoints(mut self, endpoints: Vec<String>) -> Self {
        self.config.endpoints = endpoints;
        self
    }

    /// Endpoint used for quality bursts.
    pub fn quality_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.quality_endpoint = endpoint.into();
        self
    }

    pub fn reachability_interval(mut self, interval: Duration) -> Self {
        self.config.reachability_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn quality_interval(mut self, interval: Duration) -> Self {
        self.config.quality_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Status assumed before the first probe round lands.
    pub fn assume_online(mut self, assume_online: bool) -> Self {
        self.config.assume_online = assume_online;
        self
    }

    /// Use a custom prober instead of the HTTP one. Intended for tests
    /// and for embedding platforms with their own transport.
    pub fn prober(mut self, prober: Arc<dyn Prober>) -> Self {
        self.prober = Some(prober);
        self
    }

    /// Validate the configuration and start the background tasks.
    pub fn start(self) -> Result<Monitor, MonitorError> {
        self.config.validate()?;
        let prober: Arc<dyn Prober> = match self.prober {
            Some(prober) => prober,
            None => Arc::new(HttpProber::new(self.config.probe_timeout())?),
        };
        Ok(Monitor::spawn(self.config, prober))
    }
}

/// Handle to a running monitor.
///
/// Construction starts the probing cadence immediately; the first rounds
/// are issued right away rather than one interval in. Dropping the
/// handle shuts the monitor down, though snapshots remain readable.
#[derive(Debug)]
pub struct Monitor {
    state: Arc<RwLock<EngineState>>,
    events: mpsc::UnboundedSender<EngineEvent>,
    stop: watch::Sender<bool>,
}

impl Monitor {
    pub fn builder() -> MonitorBuilder {
        MonitorBuilder::default()
    }

    fn spawn(config: MonitorConfig, prober: Arc<dyn Prober>) -> Monitor {
        let state = Arc::new(RwLock::new(EngineState::new(&config, now_ms())));
        let (events, mut event_rx) = mpsc::unbounded_channel();
        let (stop, _) = watch::channel(false);

        info!(
            "Monitor started: {} reachability endpoints, quality bursts to {}",
            config.endpoints.len(),
            config.quality_endpoint
        );

        // Applier: the only task that mutates state. The lock is never
        // held across an await.
        {
            let state = Arc::clone(&state);
            let mut stop_rx = stop.subscribe();
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        event = event_rx.recv() => {
                            let Some(event) = event else { break };
                            let now = now_ms();
                            let mut guard = state.write();
                            match event {
                                EngineEvent::Reachability(report) => {
                                    guard.apply_reachability(&report, now);
                                }
                                EngineEvent::Quality(report) => {
                                    guard.apply_quality(&report, now);
                                }
                                EngineEvent::Native { online } => {
                                    guard.apply_connectivity(online, SignalSource::Native, now);
                                }
                                EngineEvent::Fault { message } => {
                                    guard.record_debug(message, now);
                                }
                            }
                        }
                        res = stop_rx.changed() => {
                            if res.is_err() || *stop_rx.borrow() {
                                break;
                            }
                        }
                    }
                }
            });
        }

        // Reachability ticker.
        {
            let events = events.clone();
            let prober = Arc::clone(&prober);
            let endpoints = config.endpoints.clone();
            let period = config.reachability_interval();
            let mut stop_rx = stop.subscribe();
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(period);
                loop {
                    tokio::select! {
                        _ = interval.tick() => {
                            let events = events.clone();
                            let prober = Arc::clone(&prober);
                            let endpoints = endpoints.clone();
                            tokio::spawn(async move {
                                let issued_at_ms = now_ms();
                                // Inner task so a panic in probe code is
                                // contained and surfaced as a fault.
                                let round = tokio::spawn(async move {
                                    check_reachability(prober.as_ref(), &endpoints, issued_at_ms)
                                        .await
                                });
                                match round.await {
                                    Ok(report) => {
                                        let _ = events.send(EngineEvent::Reachability(report));
                                    }
                                    Err(err) => {
                                        let _ = events.send(EngineEvent::Fault {
                                            message: format!("Connection check failed: {err}"),
                                        });
                                    }
                                }
                            });
                        }
                        res = stop_rx.changed() => {
                            if res.is_err() || *stop_rx.borrow() {
                                break;
                            }
                        }
                    }
                }
            });
        }

        // Quality ticker.
        {
            let events = events.clone();
            let prober = Arc::clone(&prober);
            let endpoint = config.quality_endpoint.clone();
            let burst_size = config.burst_size;
            let threshold_ms = config.burst_latency_threshold_ms;
            let period = config.quality_interval();
            let mut stop_rx = stop.subscribe();
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(period);
                loop {
                    tokio::select! {
                        _ = interval.tick() => {
                            let events = events.clone();
                            let prober = Arc::clone(&prober);
                            let endpoint = endpoint.clone();
                            tokio::spawn(async move {
                                let issued_at_ms = now_ms();
                                let burst = tokio::spawn(async move {
                                    measure_burst(
                                        prober.as_ref(),
                                        &endpoint,
                                        burst_size,
                                        threshold_ms,
                                        issued_at_ms,
                                    )
                                    .await
                                });
                                match burst.await {
                                    Ok(report) => {
                                        let _ = events.send(EngineEvent::Quality(report));
                                    }
                                    Err(err) => {
                                        let _ = events.send(EngineEvent::Fault {
                                            message: format!("Quality check failed: {err}"),
                                        });
                                    }
                                }
                            });
                        }
                        res = stop_rx.changed() => {
                            if res.is_err() || *stop_rx.borrow() {
                                break;
                            }
                        }
                    }
                }
            });
        }

        Monitor { state, events, stop }
    }

    /// Consistent view of the current state.
    pub fn snapshot(&self) -> StatusSnapshot {
        self.state.read().snapshot(now_ms())
    }

    pub fn is_online(&self) -> bool {
        self.state.read().is_online()
    }

    /// Sender for host-platform connectivity notifications.
    pub fn native_signal(&self) -> NativeSignal {
        NativeSignal {
            events: self.events.clone(),
        }
    }

    /// Drop every retained latency sample.
    pub fn clear_latency_history(&self) {
        self.state.write().clear_latency_history();
    }

    /// Flip the debug log between live and frozen views. Returns the new
    /// expanded state.
    pub fn toggle_debug_expanded(&self) -> bool {
        self.state.write().toggle_debug_expanded()
    }

    /// Stop the tickers and the applier. Results still in flight are
    /// dropped. Calling this more than once is harmless, and snapshots
    /// stay readable afterwards.
    pub fn shutdown(&self) {
        if self.stop.send_replace(true) {
            return;
        }
        info!("Monitor shut down");
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::ConnectionStatus;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Prober that always succeeds quickly.
    #[derive(Debug)]
    struct UpProber;

    #[async_trait]
    impl Prober for UpProber {
        async fn probe(&self, _url: &str) -> Result<u64, MonitorError> {
            Ok(10)
        }
    }

    /// Prober whose outcome follows a shared flag.
    #[derive(Debug)]
    struct FlakyProber {
        up: Arc<AtomicBool>,
    }

    #[async_trait]
    impl Prober for FlakyProber {
        async fn probe(&self, _url: &str) -> Result<u64, MonitorError> {
            if self.up.load(Ordering::SeqCst) {
                Ok(25)
            } else {
                Err(MonitorError::Timeout)
            }
        }
    }

    async fn wait_until(deadline: Duration, mut check: impl FnMut() -> bool) {
        let started = tokio::time::Instant::now();
        while !check() {
            if started.elapsed() > deadline {
                panic!("condition not met within {deadline:?}");
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    fn quiet_builder(prober: Arc<dyn Prober>) -> MonitorBuilder {
        // Long intervals: only the immediate first rounds run.
        Monitor::builder()
            .endpoints(vec!["https://a.test/".to_string()])
            .quality_endpoint("https://q.test/")
            .reachability_interval(Duration::from_secs(600))
            .quality_interval(Duration::from_secs(600))
            .prober(prober)
    }

    #[test]
    fn builder_overrides_config_fields() {
        let builder = Monitor::builder()
            .endpoints(vec!["https://x.test/".to_string()])
            .quality_endpoint("https://q.test/")
            .reachability_interval(Duration::from_millis(250))
            .quality_interval(Duration::from_secs(2))
            .assume_online(false);

        assert_eq!(builder.config.endpoints, vec!["https://x.test/".to_string()]);
        assert_eq!(builder.config.quality_endpoint, "https://q.test/");
        assert_eq!(builder.config.reachability_interval_ms, 250);
        assert_eq!(builder.config.quality_interval_ms, 2_000);
        assert!(!builder.config.assume_online);
        assert!(builder.prober.is_none());
    }

    #[test]
    fn start_rejects_an_invalid_config() {
        let result = Monitor::builder().endpoints(Vec::new()).start();
        assert!(matches!(result, Err(MonitorError::Config(_))));
    }

    #[tokio::test]
    async fn probe_failures_drive_the_state_offline_exactly_once() {
        let up = Arc::new(AtomicBool::new(true));
        let monitor = Monitor::builder()
            .endpoints(vec!["https://a.test/".to_string()])
            .quality_endpoint("https://q.test/")
            .reachability_interval(Duration::from_millis(20))
            .quality_interval(Duration::from_secs(600))
            .assume_online(true)
            .prober(Arc::new(FlakyProber { up: Arc::clone(&up) }))
            .start()
            .unwrap();

        wait_until(Duration::from_secs(2), || {
            !monitor.snapshot().latency_series.is_empty()
        })
        .await;

        up.store(false, Ordering::SeqCst);
        wait_until(Duration::from_secs(2), || !monitor.is_online()).await;

        // Let several more failing rounds land
        tokio::time::sleep(Duration::from_millis(100)).await;

        let snapshot = monitor.snapshot();
        assert_eq!(snapshot.connection_log.len(), 1);
        assert_eq!(snapshot.connection_log[0].status, ConnectionStatus::Disconnected);
        assert!(snapshot.connection_log[0].session_uptime.is_some());
        monitor.shutdown();
    }

    #[tokio::test]
    async fn recovery_logs_a_connected_entry_on_top() {
        let up = Arc::new(AtomicBool::new(false));
        let monitor = Monitor::builder()
            .endpoints(vec!["https://a.test/".to_string()])
            .quality_endpoint("https://q.test/")
            .reachability_interval(Duration::from_millis(20))
            .quality_interval(Duration::from_secs(600))
            .assume_online(true)
            .prober(Arc::new(FlakyProber { up: Arc::clone(&up) }))
            .start()
            .unwrap();

        wait_until(Duration::from_secs(2), || !monitor.is_online()).await;

        up.store(true, Ordering::SeqCst);
        wait_until(Duration::from_secs(2), || monitor.is_online()).await;

        let log = monitor.snapshot().connection_log;
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].status, ConnectionStatus::Connected);
        assert_eq!(log[1].status, ConnectionStatus::Disconnected);
        monitor.shutdown();
    }

    #[tokio::test]
    async fn native_signals_route_through_the_same_transition_path() {
        let monitor = quiet_builder(Arc::new(UpProber))
            .assume_online(true)
            .start()
            .unwrap();

        // Wait for the immediate first round so it cannot race the
        // native signals below.
        wait_until(Duration::from_secs(2), || {
            monitor
                .snapshot()
                .debug_log
                .iter()
                .any(|e| e.message.starts_with("Connected to"))
        })
        .await;
        assert!(monitor.snapshot().connection_log.is_empty());

        let signal = monitor.native_signal();
        signal.offline();
        wait_until(Duration::from_secs(2), || !monitor.is_online()).await;

        // Re-asserting offline adds nothing
        signal.offline();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(monitor.snapshot().connection_log.len(), 1);

        signal.online();
        wait_until(Duration::from_secs(2), || monitor.is_online()).await;

        let log = monitor.snapshot().connection_log;
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].status, ConnectionStatus::Connected);
        assert_eq!(log[1].status, ConnectionStatus::Disconnected);
        monitor.shutdown();
    }

    #[tokio::test]
    async fn quality_burst_fills_the_metrics() {
        let monitor = quiet_builder(Arc::new(UpProber))
            .assume_online(true)
            .start()
            .unwrap();

        wait_until(Duration::from_secs(2), || {
            monitor
                .snapshot()
                .latency_series
                .iter()
                .any(|s| s.endpoint == "https://q.test/")
        })
        .await;

        let snapshot = monitor.snapshot();
        // Identical burst latencies: zero jitter, nothing over threshold
        assert_eq!(snapshot.jitter_ms, 0.0);
        assert_eq!(snapshot.packet_loss_percent, 0);
        monitor.shutdown();
    }

    #[tokio::test]
    async fn shutdown_drops_rounds_still_in_flight() {
        #[derive(Debug)]
        struct SlowProber;

        #[async_trait]
        impl Prober for SlowProber {
            async fn probe(&self, _url: &str) -> Result<u64, MonitorError> {
                tokio::time::sleep(Duration::from_millis(100)).await;
                Ok(100)
            }
        }

        let monitor = quiet_builder(Arc::new(SlowProber))
            .assume_online(false)
            .start()
            .unwrap();

        // The immediate first rounds are still in flight
        tokio::time::sleep(Duration::from_millis(40)).await;
        monitor.shutdown();
        monitor.shutdown();

        tokio::time::sleep(Duration::from_millis(150)).await;
        let snapshot = monitor.snapshot();
        assert!(!snapshot.is_online);
        assert!(snapshot.connection_log.is_empty());
        assert!(snapshot.latency_series.is_empty());
    }

    #[tokio::test]
    async fn clear_and_toggle_work_through_the_handle() {
        let monitor = quiet_builder(Arc::new(UpProber))
            .assume_online(true)
            .start()
            .unwrap();

        wait_until(Duration::from_secs(2), || {
            !monitor.snapshot().latency_series.is_empty()
        })
        .await;

        assert!(monitor.toggle_debug_expanded());
        assert!(monitor.snapshot().debug_expanded);
        assert!(!monitor.toggle_debug_expanded());

        monitor.shutdown();
        tokio::time::sleep(Duration::from_millis(50)).await;
        monitor.clear_latency_history();
        assert!(monitor.snapshot().latency_series.is_empty());
    }

    #[tokio::test]
    async fn a_panicking_probe_is_surfaced_as_a_fault() {
        #[derive(Debug)]
        struct PanicProber;

        #[async_trait]
        impl Prober for PanicProber {
            async fn probe(&self, _url: &str) -> Result<u64, MonitorError> {
                panic!("probe exploded");
            }
        }

        let monitor = Monitor::builder()
            .endpoints(vec!["https://a.test/".to_string()])
            .quality_endpoint("https://q.test/")
            .reachability_interval(Duration::from_millis(20))
            .quality_interval(Duration::from_secs(600))
            .assume_online(true)
            .prober(Arc::new(PanicProber))
            .start()
            .unwrap();

        // Two fault entries prove the cadence outlived the first panic
        wait_until(Duration::from_secs(2), || {
            monitor
                .snapshot()
                .debug_log
                .iter()
                .filter(|e| e.message.starts_with("Connection check failed:"))
                .count()
                >= 2
        })
        .await;

        // Faults never transition connectivity
        assert!(monitor.is_online());
        monitor.shutdown();
    }
}
