use crate::protocol::{PeerId, TaskType};
use crate::scoring::EvaluationStatus;
use std::time::Duration;

/// Domain events the validator reports.
#[derive(Debug, Clone)]
pub enum ObserverEvent {
    ResponseScored {
        peer: PeerId,
        task_type: TaskType,
        status: EvaluationStatus,
        score: f64,
    },
    PlagiarismFlagged {
        peer: PeerId,
        similarity: f64,
        violation_count: u32,
    },
    PeerBlacklisted {
        peer: PeerId,
    },
    JudgeDegraded {
        reason: String,
    },
    WeightsComputed {
        peers: usize,
        top_weight: f64,
    },
    StepCompleted {
        step: u64,
        task_type: TaskType,
        responses: usize,
        duration: Duration,
    },
}

/// Numeric metrics
#[derive(Debug, Clone)]
pub enum ObserverMetric {
    BatchLatency(Duration),
    HistorySize(u64),
    ActivePeers(u64),
}

pub trait Observer: Send + Sync {
    fn record_event(&self, event: &ObserverEvent);

    fn record_metric(&self, metric: &ObserverMetric);

    /// Flush any buffered data (no-op for most backends)
    fn flush(&self) {}

    fn name(&self) -> &str;
}
