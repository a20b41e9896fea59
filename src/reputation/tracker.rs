use crate::config::ReputationConfig;
use crate::protocol::PeerId;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReputationState {
    pub ema_score: f64,
    /// Only a manual reset lowers this.
    pub violation_count: u32,
    /// One-way latch; only a manual reset clears it.
    pub is_blacklisted: bool,
    pub observations: u64,
}

/// Result of recording one plagiarism violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViolationOutcome {
    pub violation_count: u32,
    /// True only on the violation that tripped the latch.
    pub newly_blacklisted: bool,
}

/// Per-peer EMA of final scores plus violation bookkeeping.
#[derive(Debug)]
pub struct ReputationTracker {
    states: HashMap<PeerId, ReputationState>,
    alpha: f64,
    blacklist_threshold: u32,
}

impl ReputationTracker {
    pub fn new(alpha: f64, blacklist_threshold: u32) -> Self {
        Self {
            states: HashMap::new(),
            alpha: alpha.clamp(f64::MIN_POSITIVE, 1.0),
            blacklist_threshold: blacklist_threshold.max(1),
        }
    }

    pub fn from_config(config: &ReputationConfig) -> Self {
        Self::new(config.ema_alpha, config.blacklist_threshold)
    }

    /// Blends `score` into the peer's EMA. The first observation initializes it.
    pub fn update_score(&mut self, peer: &PeerId, score: f64) -> f64 {
        let alpha = self.alpha;
        let state = self
            .states
            .entry(peer.clone())
            .or_insert_with(|| ReputationState {
                ema_score: score,
                violation_count: 0,
                is_blacklisted: false,
                observations: 0,
            });
        if state.observations > 0 {
            state.ema_score = alpha * score + (1.0 - alpha) * state.ema_score;
        } else {
            state.ema_score = score;
        }
        state.observations += 1;
        state.ema_score
    }

    pub fn record_violation(&mut self, peer: &PeerId) -> ViolationOutcome {
        let threshold = self.blacklist_threshold;
        let state = self
            .states
            .entry(peer.clone())
            .or_insert_with(|| ReputationState {
                ema_score: 0.0,
                violation_count: 0,
                is_blacklisted: false,
                observations: 0,
            });
        state.violation_count = state.violation_count.saturating_add(1);
        let newly_blacklisted = !state.is_blacklisted && state.violation_count >= threshold;
        if newly_blacklisted {
            state.is_blacklisted = true;
        }
        ViolationOutcome {
            violation_count: state.violation_count,
            newly_blacklisted,
        }
    }

    /// Clears violations and the blacklist latch. EMA is kept.
    pub fn reset(&mut self, peer: &PeerId) {
        if let Some(state) = self.states.get_mut(peer) {
            state.violation_count = 0;
            state.is_blacklisted = false;
        }
    }

    pub fn is_blacklisted(&self, peer: &PeerId) -> bool {
        self.states.get(peer).is_some_and(|s| s.is_blacklisted)
    }

    pub fn state(&self, peer: &PeerId) -> Option<&ReputationState> {
        self.states.get(peer)
    }

    pub fn ema(&self, peer: &PeerId) -> Option<f64> {
        self.states
            .get(peer)
            .filter(|s| s.observations > 0)
            .map(|s| s.ema_score)
    }

    /// EMA of every scored, non-blacklisted peer.
    pub fn active_scores(&self) -> BTreeMap<PeerId, f64> {
        self.states
            .iter()
            .filter(|(_, s)| !s.is_blacklisted && s.observations > 0)
            .map(|(peer, s)| (peer.clone(), s.ema_score))
            .collect()
    }

    pub fn blacklisted(&self) -> Vec<PeerId> {
        let mut peers: Vec<PeerId> = self
            .states
            .iter()
            .filter(|(_, s)| s.is_blacklisted)
            .map(|(peer, _)| peer.clone())
            .collect();
        peers.sort();
        peers
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
