use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;

use linkwatch::{Monitor, MonitorConfig, StatusSnapshot};

#[derive(Parser, Debug)]
#[command(name = "linkwatch")]
#[command(about = "Internet connectivity monitor: probes endpoints and reports status")]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reachability endpoint to probe (repeatable, overrides config)
    #[arg(short, long = "endpoint")]
    endpoint: Vec<String>,

    /// Endpoint used for quality bursts (overrides config)
    #[arg(long)]
    quality_endpoint: Option<String>,

    /// Probe interval in milliseconds for both tickers (overrides config)
    #[arg(short, long)]
    interval_ms: Option<u64>,

    /// Status output interval in seconds
    #[arg(short, long, default_value = "1")]
    refresh: u64,

    /// Emit NDJSON snapshots instead of the status line
    #[arg(short, long)]
    json: bool,

    /// Exit after this many seconds instead of running until Ctrl-C
    #[arg(short, long)]
    duration: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the status output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("linkwatch=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => MonitorConfig::from_file(path)?,
        None => MonitorConfig::default(),
    };
    if !args.endpoint.is_empty() {
        config.endpoints = args.endpoint.clone();
    }
    if let Some(endpoint) = &args.quality_endpoint {
        config.quality_endpoint = endpoint.clone();
    }
    if let Some(interval_ms) = args.interval_ms {
        config.reachability_interval_ms = interval_ms;
        config.quality_interval_ms = interval_ms;
    }

    let monitor = Monitor::builder().config(config).start()?;

    let started = Instant::now();
    let mut ticker = tokio::time::interval(Duration::from_secs(args.refresh.max(1)));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let snapshot = monitor.snapshot();
                if args.json {
                    println!("{}", serde_json::to_string(&snapshot)?);
                } else {
                    print_status(&snapshot);
                }
                if let Some(limit) = args.duration {
                    if started.elapsed() >= Duration::from_secs(limit) {
                        break;
                    }
                }
            }
            _ = &mut ctrl_c => {
                break;
            }
        }
    }

    monitor.shutdown();
    Ok(())
}

fn print_status(snapshot: &StatusSnapshot) {
    let state = if snapshot.is_online { "ONLINE " } else { "OFFLINE" };
    println!(
        "{state} up {}  jitter {:.1}ms  loss {}%  samples {}  transitions {}",
        snapshot.uptime_label,
        snapshot.jitter_ms,
        snapshot.packet_loss_percent,
        snapshot.latency_series.len(),
        snapshot.connection_log.len(),
    );
}
