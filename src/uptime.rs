//! Session uptime tracking, gated by connectivity state.

/// Elapsed-session clock.
///
/// Started when a session first comes online and stopped on disconnect.
/// Stopping freezes the label at the stop instant but keeps the session
/// start, so a later reconnect resumes counting from the original session
/// rather than restarting at zero.
#[derive(Debug, Clone, Default)]
pub struct UptimeClock {
    session_start_ms: Option<u64>,
    stopped_at_ms: Option<u64>,
    running: bool,
}

impl UptimeClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the clock. No-op if already running. The session start is set
    /// only if no session was ever started.
    pub fn start(&mut self, now_ms: u64) {
        if self.running {
            return;
        }
        if self.session_start_ms.is_none() {
            self.session_start_ms = Some(now_ms);
        }
        self.stopped_at_ms = None;
        self.running = true;
    }

    /// Stop the clock, freezing the label at `now_ms`. The session start is
    /// preserved for the disconnect log entry. No-op if already stopped.
    pub fn stop(&mut self, now_ms: u64) {
        if !self.running {
            return;
        }
        self.running = false;
        self.stopped_at_ms = Some(now_ms);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Formatted elapsed session time.
    ///
    /// Advances with `now_ms` while running, stays at the stop instant
    /// while stopped, and reads `0h 0m 0s` before any session has started.
    pub fn label(&self, now_ms: u64) -> String {
        let Some(start) = self.session_start_ms else {
            return format_uptime(0);
        };
        let end = if self.running {
            now_ms
        } else {
            self.stopped_at_ms.unwrap_or(start)
        };
        format_uptime(end.saturating_sub(start))
    }
}

/// Format a millisecond duration as `"{h}h {m}m {s}s"`.
pub fn format_uptime(elapsed_ms: u64) -> String {
    let total_secs = elapsed_ms / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{}h {}m {}s", hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(0), "0h 0m 0s");
        assert_eq!(format_uptime(999), "0h 0m 0s");
        assert_eq!(format_uptime(65_000), "0h 1m 5s");
        assert_eq!(format_uptime(3_725_000), "1h 2m 5s");
        assert_eq!(format_uptime(90_000_000), "25h 0m 0s");
    }

    #[test]
    fn label_reads_zero_before_any_session() {
        let clock = UptimeClock::new();
        assert_eq!(clock.label(123_456), "0h 0m 0s");
        assert!(!clock.is_running());
    }

    #[test]
    fn label_advances_while_running() {
        let mut clock = UptimeClock::new();
        clock.start(1_000);
        assert_eq!(clock.label(1_000), "0h 0m 0s");
        assert_eq!(clock.label(61_000), "0h 1m 0s");
        assert_eq!(clock.label(3_661_000 + 1_000), "1h 1m 1s");
    }

    #[test]
    fn stop_freezes_label_at_stop_instant() {
        let mut clock = UptimeClock::new();
        clock.start(0);
        clock.stop(30_000);

        assert_eq!(clock.label(30_000), "0h 0m 30s");
        // Time keeps passing but the label must not advance while stopped
        assert_eq!(clock.label(120_000), "0h 0m 30s");
    }

    #[test]
    fn start_is_a_noop_while_running() {
        let mut clock = UptimeClock::new();
        clock.start(0);
        clock.start(50_000);

        // Session start unchanged by the second call
        assert_eq!(clock.label(60_000), "0h 1m 0s");
    }

    #[test]
    fn stop_is_a_noop_while_stopped() {
        let mut clock = UptimeClock::new();
        clock.start(0);
        clock.stop(10_000);
        clock.stop(99_000);

        assert_eq!(clock.label(100_000), "0h 0m 10s");
    }

    #[test]
    fn restart_preserves_original_session_start() {
        let mut clock = UptimeClock::new();
        clock.start(0);
        clock.stop(10_000);
        clock.start(30_000);

        // Elapsed is measured from the original session start, so the label
        // jumps forward across the offline gap on reconnect.
        assert_eq!(clock.label(40_000), "0h 0m 40s");
        assert!(clock.is_running());
    }
}
