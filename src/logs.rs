//! Bounded event logs: the connection transition log and the debug log.
//!
//! Both logs are capped ring buffers, but with opposite reading orders:
//! the connection log is read newest-first (latest transition on top) and
//! evicts its oldest entry; the debug log is read oldest-first and keeps
//! only the last few messages, with an optional frozen snapshot view.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum number of connection transitions retained.
pub const CONNECTION_LOG_CAP: usize = 50;

/// Maximum number of live debug messages retained.
pub const DEBUG_LOG_CAP: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

/// A single connectivity transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionLogEntry {
    pub timestamp_ms: u64,
    pub status: ConnectionStatus,
    /// Uptime label of the session that just ended. Present only on
    /// disconnect entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_uptime: Option<String>,
}

/// Newest-first log of connectivity transitions, capped at
/// [`CONNECTION_LOG_CAP`] entries.
#[derive(Debug, Clone, Default)]
pub struct ConnectionLog {
    entries: VecDeque<ConnectionLogEntry>,
}

impl ConnectionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a transition. The oldest entry is evicted once the cap is
    /// reached.
    pub fn record(&mut self, entry: ConnectionLogEntry) {
        self.entries.push_front(entry);
        while self.entries.len() > CONNECTION_LOG_CAP {
            self.entries.pop_back();
        }
    }

    /// Entries in newest-first order.
    pub fn entries(&self) -> impl Iterator<Item = &ConnectionLogEntry> {
        self.entries.iter()
    }

    /// Newest-first owned copy, for snapshots.
    pub fn to_vec(&self) -> Vec<ConnectionLogEntry> {
        self.entries.iter().cloned().collect()
    }

    /// The most recent transition, if any.
    pub fn latest(&self) -> Option<&ConnectionLogEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugLogEntry {
    pub timestamp_ms: u64,
    pub message: String,
}

#[derive(Debug, Clone)]
enum DebugView {
    /// Reads follow the live ring.
    Live,
    /// Reads return the snapshot taken when the view was expanded. The
    /// live ring keeps rolling underneath.
    Frozen(Vec<DebugLogEntry>),
}

/// Rolling log of the last few diagnostic messages.
///
/// While expanded, `visible()` returns the entries captured at expansion
/// time, so the view holds still while new messages keep arriving.
#[derive(Debug, Clone)]
pub struct DebugLog {
    live: VecDeque<DebugLogEntry>,
    view: DebugView,
}

impl Default for DebugLog {
    fn default() -> Self {
        Self {
            live: VecDeque::new(),
            view: DebugView::Live,
        }
    }
}

impl DebugLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message, dropping the oldest past the cap. The live ring
    /// rolls even while the view is frozen.
    pub fn record(&mut self, entry: DebugLogEntry) {
        self.live.push_back(entry);
        while self.live.len() > DEBUG_LOG_CAP {
            self.live.pop_front();
        }
    }

    /// Flip between the live view and a frozen snapshot of the current
    /// entries. Returns the new expanded state.
    pub fn toggle_expanded(&mut self) -> bool {
        match self.view {
            DebugView::Live => {
                self.view = DebugView::Frozen(self.live.iter().cloned().collect());
                true
            }
            DebugView::Frozen(_) => {
                self.view = DebugView::Live;
                false
            }
        }
    }

    pub fn is_expanded(&self) -> bool {
        matches!(self.view, DebugView::Frozen(_))
    }

    /// Entries the reader should see right now, oldest first.
    pub fn visible(&self) -> Vec<DebugLogEntry> {
        match &self.view {
            DebugView::Live => self.live.iter().cloned().collect(),
            DebugView::Frozen(snapshot) => snapshot.clone(),
        }
    }
}
