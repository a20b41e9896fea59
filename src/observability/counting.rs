use super::traits::{Observer, ObserverEvent, ObserverMetric};
use std::sync::atomic::{AtomicU64, Ordering};

/// Tallies events by kind. Useful for tests and for the simulate summary.
#[derive(Default)]
pub struct CountingObserver {
    scored: AtomicU64,
    plagiarism: AtomicU64,
    blacklisted: AtomicU64,
    judge_degraded: AtomicU64,
    weight_updates: AtomicU64,
    steps: AtomicU64,
}

/// Point-in-time view of a [`CountingObserver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventCounts {
    pub scored: u64,
    pub plagiarism: u64,
    pub blacklisted: u64,
    pub judge_degraded: u64,
    pub weight_updates: u64,
    pub steps: u64,
}

impl CountingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counts(&self) -> EventCounts {
        EventCounts {
            scored: self.scored.load(Ordering::Relaxed),
            plagiarism: self.plagiarism.load(Ordering::Relaxed),
            blacklisted: self.blacklisted.load(Ordering::Relaxed),
            judge_degraded: self.judge_degraded.load(Ordering::Relaxed),
            weight_updates: self.weight_updates.load(Ordering::Relaxed),
            steps: self.steps.load(Ordering::Relaxed),
        }
    }
}

impl Observer for CountingObserver {
    fn record_event(&self, event: &ObserverEvent) {
        let counter = match event {
            ObserverEvent::ResponseScored { .. } => &self.scored,
            ObserverEvent::PlagiarismFlagged { .. } => &self.plagiarism,
            ObserverEvent::PeerBlacklisted { .. } => &self.blacklisted,
            ObserverEvent::JudgeDegraded { .. } => &self.judge_degraded,
            ObserverEvent::WeightsComputed { .. } => &self.weight_updates,
            ObserverEvent::StepCompleted { .. } => &self.steps,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn record_metric(&self, _metric: &ObserverMetric) {}

    fn flush(&self) {
        let counts = self.counts();
        tracing::debug!(
            scored = counts.scored,
            plagiarism = counts.plagiarism,
            blacklisted = counts.blacklisted,
            steps = counts.steps,
            "observer.counting.flush"
        );
    }

    fn name(&self) -> &str {
        "counting"
    }
}
