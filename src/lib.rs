//! # linkwatch
//!
//! An internet connectivity monitor engine.
//!
//! This crate probes a set of HTTP endpoints on a fixed cadence, reconciles
//! the results with the host platform's own online/offline notifications,
//! and maintains the derived state a status display needs: a sliding window
//! of latency samples, jitter and heuristic loss figures, a capped log of
//! connectivity transitions, and a session uptime clock.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                          Monitor                           │
//! │                                                            │
//! │  reachability ticker ──┐                                   │
//! │  quality ticker ───────┼──▶ applier ──▶ EngineState        │
//! │  NativeSignal ─────────┘                    │              │
//! │                                             ▼              │
//! │                                      StatusSnapshot        │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`monitor`]**: The runtime — interval tickers, the applier task that
//!   owns all mutation, and the handle consumers hold
//! - **[`engine`]**: The reconciliation state machine every signal routes
//!   through, so a genuine edge is logged exactly once
//! - **[`probe`]**: The [`Prober`] trait, the HTTP implementation, and the
//!   concurrent reachability fan-out
//! - **[`quality`]**: Sequential probe bursts and the jitter / loss math
//! - **[`series`]**, **[`logs`]**, **[`uptime`]**: Windowed latency samples,
//!   capped logs, and the session clock
//! - **[`config`]**, **[`snapshot`]**, **[`error`]**: Configuration loading,
//!   the exported view, and the error type
//!
//! ## Features
//!
//! - **Reachability fan-out**: Endpoints are probed concurrently; the
//!   connection counts as online while any one of them answers
//! - **Quality bursts**: Jitter and a heuristic loss percentage derived
//!   from short sequential bursts
//! - **Session uptime**: A clock that freezes while offline and resumes
//!   the same session on reconnect
//! - **Bounded logs**: The last 50 transitions and the last 5 diagnostic
//!   messages, with a freezable debug view
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch connectivity with the default endpoints
//! linkwatch
//!
//! # Custom endpoints, NDJSON output
//! linkwatch --endpoint https://example.com/favicon.ico --json
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use linkwatch::Monitor;
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let monitor = Monitor::builder()
//!     .reachability_interval(Duration::from_secs(1))
//!     .start()
//!     .unwrap();
//!
//! let snapshot = monitor.snapshot();
//! println!("online: {}", snapshot.is_online);
//! monitor.shutdown();
//! # });
//! ```
//!
//! ### Feeding native connectivity events
//!
//! ```no_run
//! use linkwatch::Monitor;
//!
//! # tokio_test::block_on(async {
//! let monitor = Monitor::builder().start().unwrap();
//! let signal = monitor.native_signal();
//!
//! // Wire these to the host platform's notifications
//! signal.offline();
//! signal.online();
//! # });
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod logs;
pub mod monitor;
pub mod probe;
pub mod quality;
pub mod series;
pub mod snapshot;
pub mod uptime;

// Re-export main types for convenience
pub use config::MonitorConfig;
pub use engine::{EngineState, SignalSource};
pub use error::MonitorError;
pub use logs::{
    ConnectionLog, ConnectionLogEntry, ConnectionStatus, DebugLog, DebugLogEntry,
    CONNECTION_LOG_CAP, DEBUG_LOG_CAP,
};
pub use monitor::{Monitor, MonitorBuilder, NativeSignal};
pub use probe::{check_reachability, HttpProber, ProbeResult, Prober, ReachabilityReport};
pub use quality::{jitter, loss_percent, measure_burst, BurstReport, QualityMetrics};
pub use series::{LatencyHistory, LatencySample};
pub use snapshot::StatusSnapshot;
pub use uptime::{format_uptime, UptimeClock};
