use crate::protocol::{OutputData, PeerId, TaskType};
use crate::scoring::similarity::content_hash;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// One scored response, with its canonical text and hash precomputed.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub peer: PeerId,
    pub task_type: TaskType,
    pub output: OutputData,
    pub canonical: String,
    pub hash: String,
    pub score: f64,
    pub timestamp: DateTime<Utc>,
}

/// Bounded FIFO of past responses shared by plagiarism, originality and
/// historical-average lookups.
#[derive(Debug)]
pub struct HistoryStore {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl HistoryStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, peer: PeerId, task_type: TaskType, output: &OutputData, score: f64) {
        let canonical = output.canonical();
        let hash = content_hash(&canonical);
        self.push(HistoryEntry {
            peer,
            task_type,
            output: output.clone(),
            canonical,
            hash,
            score,
            timestamp: Utc::now(),
        });
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// The last `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().skip(self.entries.len().saturating_sub(n))
    }

    /// Mean score over the peer's last `window` entries.
    pub fn peer_average(&self, peer: &PeerId, window: usize) -> Option<f64> {
        let scores: Vec<f64> = self
            .entries
            .iter()
            .rev()
            .filter(|entry| &entry.peer == peer)
            .take(window)
            .map(|entry| entry.score)
            .collect();
        if scores.is_empty() {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let count = scores.len() as f64;
        Some(scores.iter().sum::<f64>() / count)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn output(n: usize) -> OutputData {
        OutputData::from_value(json!({ "n": n }))
    }

    #[test]
    fn evicts_oldest_first() {
        let mut store = HistoryStore::new(3);
        for n in 0..5 {
            store.record("p".into(), TaskType::Blueprint, &output(n), 0.0);
        }
        assert_eq!(store.len(), 3);
        let kept: Vec<&str> = store.iter().map(|e| e.canonical.as_str()).collect();
        assert_eq!(kept, vec![r#"{"n":2}"#, r#"{"n":3}"#, r#"{"n":4}"#]);
    }

    #[test]
    fn recent_returns_tail_in_order() {
        let mut store = HistoryStore::new(10);
        for n in 0..4 {
            store.record("p".into(), TaskType::Blueprint, &output(n), 0.0);
        }
        let tail: Vec<&str> = store.recent(2).map(|e| e.canonical.as_str()).collect();
        assert_eq!(tail, vec![r#"{"n":2}"#, r#"{"n":3}"#]);
        assert_eq!(store.recent(100).count(), 4);
    }

    #[test]
    fn peer_average_uses_only_that_peer() {
        let mut store = HistoryStore::new(10);
        store.record("a".into(), TaskType::Blueprint, &output(0), 10.0);
        store.record("b".into(), TaskType::Blueprint, &output(1), 90.0);
        store.record("a".into(), TaskType::Blueprint, &output(2), 30.0);
        store.record("a".into(), TaskType::Blueprint, &output(3), 50.0);
        let average = store.peer_average(&"a".into(), 2).unwrap();
        assert!((average - 40.0).abs() < 1e-9);
        assert!(store.peer_average(&"c".into(), 50).is_none());
    }
}
