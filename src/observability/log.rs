use super::traits::{Observer, ObserverEvent, ObserverMetric};
use tracing::{debug, info, warn};

/// Emits every event as a `tracing` record.
pub struct LogObserver;

impl LogObserver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogObserver {
    fn default() -> Self {
        Self::new()
    }
}

fn millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl Observer for LogObserver {
    fn record_event(&self, event: &ObserverEvent) {
        match event {
            ObserverEvent::ResponseScored {
                peer,
                task_type,
                status,
                score,
            } => {
                debug!(peer = %peer, task_type = %task_type, status = %status, score, "response.scored");
            }
            ObserverEvent::PlagiarismFlagged {
                peer,
                similarity,
                violation_count,
            } => {
                warn!(peer = %peer, similarity, violation_count, "plagiarism.flagged");
            }
            ObserverEvent::PeerBlacklisted { peer } => {
                warn!(peer = %peer, "peer.blacklisted");
            }
            ObserverEvent::JudgeDegraded { reason } => {
                warn!(reason = %reason, "judge.degraded");
            }
            ObserverEvent::WeightsComputed { peers, top_weight } => {
                info!(peers, top_weight, "weights.computed");
            }
            ObserverEvent::StepCompleted {
                step,
                task_type,
                responses,
                duration,
            } => {
                info!(
                    step,
                    task_type = %task_type,
                    responses,
                    duration_ms = millis(*duration),
                    "step.completed"
                );
            }
        }
    }

    fn record_metric(&self, metric: &ObserverMetric) {
        match metric {
            ObserverMetric::BatchLatency(d) => {
                debug!(latency_ms = millis(*d), "metric.batch_latency");
            }
            ObserverMetric::HistorySize(n) => {
                debug!(entries = n, "metric.history_size");
            }
            ObserverMetric::ActivePeers(n) => {
                debug!(peers = n, "metric.active_peers");
            }
        }
    }

    fn name(&self) -> &str {
        "log"
    }
}
