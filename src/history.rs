//! Write history tracking for debugging and diagnostics.

use std::collections::HashMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What happened to a requested write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WriteKind {
    /// Sent to the bridge and acknowledged.
    Applied,
    /// Suppressed because it matched the last applied state.
    Debounced,
    /// Sent to the bridge and rejected, or the request failed.
    Failed,
}

/// A recorded write in the history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub kind: WriteKind,
    pub patch: Value,
    /// Seconds since history creation
    pub timestamp: f64,
}

/// Tracks the writes issued by one controller.
#[derive(Debug, Clone)]
pub struct WriteHistory {
    counts: HashMap<WriteKind, usize>,
    last_error: Option<String>,
    start_time: Instant,
    entries: Vec<HistoryEntry>,
    max_entries: usize,
}

impl Default for WriteHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl WriteHistory {
    pub const DEFAULT_MAX_ENTRIES: usize = 100;

    pub fn new() -> Self {
        Self {
            counts: HashMap::new(),
            last_error: None,
            start_time: Instant::now(),
            entries: Vec::new(),
            max_entries: Self::DEFAULT_MAX_ENTRIES,
        }
    }

    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            max_entries,
            ..Self::new()
        }
    }

    pub fn record(&mut self, kind: WriteKind, patch: Value) {
        *self.counts.entry(kind).or_default() += 1;

        self.entries.push(HistoryEntry {
            kind,
            patch,
            timestamp: self.start_time.elapsed().as_secs_f64(),
        });

        if self.entries.len() > self.max_entries {
            self.entries.remove(0);
        }
    }

    pub fn record_error(&mut self, patch: Value, error: &str) {
        self.record(WriteKind::Failed, patch);
        self.last_error = Some(error.to_string());
    }

    pub fn count(&self, kind: WriteKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.counts.clear();
        self.entries.clear();
        self.last_error = None;
    }

    pub fn summary(&self) -> HistorySummary {
        HistorySummary {
            applied: self.count(WriteKind::Applied),
            debounced: self.count(WriteKind::Debounced),
            failed: self.count(WriteKind::Failed),
            total_entries: self.entries.len(),
            last_error: self.last_error.clone(),
        }
    }
}

/// Summary of write history for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistorySummary {
    pub applied: usize,
    pub debounced: usize,
    pub failed: usize,
    pub total_entries: usize,
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_write() {
        let mut history = WriteHistory::new();
        history.record(WriteKind::Applied, json!({"on": {"on": true}}));
        history.record(WriteKind::Debounced, json!({"on": {"on": true}}));

        assert_eq!(history.len(), 2);
        assert_eq!(history.count(WriteKind::Applied), 1);
        assert_eq!(history.count(WriteKind::Debounced), 1);
    }

    #[test]
    fn test_record_error() {
        let mut history = WriteHistory::new();
        history.record_error(json!({"dimming": {"brightness": 5.0}}), "connection timeout");
        assert_eq!(history.last_error(), Some("connection timeout"));
        assert_eq!(history.summary().failed, 1);
    }

    #[test]
    fn test_max_entries() {
        let mut history = WriteHistory::with_max_entries(2);
        for i in 0..5 {
            history.record(WriteKind::Applied, json!({"dimming": {"brightness": i}}));
        }
        assert_eq!(history.len(), 2);
        // counts survive eviction
        assert_eq!(history.summary().applied, 5);
    }
}
