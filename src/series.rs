//! Sliding-window storage of latency samples.

use serde::{Deserialize, Serialize};

/// One latency measurement against one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencySample {
    pub endpoint: String,
    pub latency_ms: u64,
    /// Unix timestamp in milliseconds when the sample was recorded.
    pub timestamp_ms: u64,
}

/// Sliding-window store of latency samples across all endpoints.
///
/// Samples are kept in ascending timestamp order. Every insert first prunes
/// anything that has fallen out of the window relative to the inserted
/// sample, so no retained sample is ever older than the window relative to
/// the most recent insert.
#[derive(Debug, Clone)]
pub struct LatencyHistory {
    samples: Vec<LatencySample>,
    window_ms: u64,
}

impl LatencyHistory {
    pub fn new(window_ms: u64) -> Self {
        Self {
            samples: Vec::new(),
            window_ms,
        }
    }

    /// Insert a sample, pruning expired ones first.
    ///
    /// The insert position is found by binary search, so a late-arriving
    /// sample with an older timestamp cannot break the ascending order.
    pub fn insert(&mut self, sample: LatencySample) {
        self.prune(sample.timestamp_ms);
        let at = self
            .samples
            .partition_point(|s| s.timestamp_ms <= sample.timestamp_ms);
        self.samples.insert(at, sample);
    }

    /// Drop all samples with `timestamp_ms < now_ms - window`.
    pub fn prune(&mut self, now_ms: u64) {
        let cutoff = now_ms.saturating_sub(self.window_ms);
        self.samples.retain(|s| s.timestamp_ms >= cutoff);
    }

    /// All retained samples, ascending by timestamp.
    pub fn window(&self) -> &[LatencySample] {
        &self.samples
    }

    /// Retained samples for one endpoint, ascending by timestamp.
    pub fn window_for(&self, endpoint: &str) -> Vec<LatencySample> {
        self.samples
            .iter()
            .filter(|s| s.endpoint == endpoint)
            .cloned()
            .collect()
    }

    /// Discard every sample unconditionally. This is the user-triggered
    /// reset, independent of window pruning.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(endpoint: &str, latency_ms: u64, timestamp_ms: u64) -> LatencySample {
        LatencySample {
            endpoint: endpoint.to_string(),
            latency_ms,
            timestamp_ms,
        }
    }

    #[test]
    fn insert_prunes_samples_outside_the_window() {
        let mut history = LatencyHistory::new(30_000);

        history.insert(sample("a", 100, 0));
        history.insert(sample("a", 110, 10_000));
        history.insert(sample("a", 120, 29_000));
        assert_eq!(history.len(), 3);

        // 0 and 10_000 are now older than 41_000 - 30_000
        history.insert(sample("a", 130, 41_000));

        assert_eq!(history.len(), 2);
        assert_eq!(history.window()[0].timestamp_ms, 29_000);
        assert_eq!(history.window()[1].timestamp_ms, 41_000);
    }

    #[test]
    fn no_retained_sample_older_than_window_after_any_insert() {
        let mut history = LatencyHistory::new(5_000);
        let stamps = [0, 1_000, 2_500, 4_000, 9_500, 12_000, 12_100];

        for (i, &ts) in stamps.iter().enumerate() {
            history.insert(sample("e", i as u64, ts));
            let newest = history.window().last().unwrap().timestamp_ms;
            assert!(history
                .window()
                .iter()
                .all(|s| s.timestamp_ms >= newest.saturating_sub(5_000)));
        }
    }

    #[test]
    fn samples_stay_ascending_when_a_late_tick_arrives() {
        let mut history = LatencyHistory::new(60_000);

        history.insert(sample("a", 100, 5_000));
        history.insert(sample("b", 200, 9_000));
        // A slow round from an earlier tick lands after a newer one
        history.insert(sample("a", 150, 7_000));

        let stamps: Vec<u64> = history.window().iter().map(|s| s.timestamp_ms).collect();
        assert_eq!(stamps, vec![5_000, 7_000, 9_000]);
    }

    #[test]
    fn window_for_filters_by_endpoint() {
        let mut history = LatencyHistory::new(60_000);

        history.insert(sample("a", 100, 1_000));
        history.insert(sample("b", 250, 2_000));
        history.insert(sample("a", 120, 3_000));

        let only_a = history.window_for("a");
        assert_eq!(only_a.len(), 2);
        assert!(only_a.iter().all(|s| s.endpoint == "a"));
        assert_eq!(only_a[0].latency_ms, 100);
        assert_eq!(only_a[1].latency_ms, 120);
    }

    #[test]
    fn clear_empties_the_window_regardless_of_contents() {
        let mut history = LatencyHistory::new(30_000);
        for i in 0..10 {
            history.insert(sample("a", 100, i * 1_000));
        }
        assert!(!history.is_empty());

        history.clear();

        assert!(history.is_empty());
        assert!(history.window().is_empty());
    }

    #[test]
    fn equal_timestamps_preserve_insertion_order() {
        let mut history = LatencyHistory::new(30_000);

        // A burst records several samples at the same apply instant
        history.insert(sample("q", 100, 5_000));
        history.insert(sample("q", 300, 5_000));
        history.insert(sample("q", 100, 5_000));

        let latencies: Vec<u64> = history.window().iter().map(|s| s.latency_ms).collect();
        assert_eq!(latencies, vec![100, 300, 100]);
    }
}
