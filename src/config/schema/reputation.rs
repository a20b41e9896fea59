use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReputationConfig {
    /// EMA smoothing factor in (0, 1].
    #[serde(default = "default_ema_alpha")]
    pub ema_alpha: f64,
    /// Exponent applied to composite scores before normalization.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Minimum weight any scored peer receives.
    #[serde(default = "default_min_weight")]
    pub min_weight: f64,
    #[serde(default = "default_stake_share")]
    pub stake_share: f64,
    #[serde(default = "default_quality_share")]
    pub quality_share: f64,
    #[serde(default = "default_history_share")]
    pub history_share: f64,
    /// Per-peer history entries averaged for the long-run component.
    #[serde(default = "default_history_window")]
    pub history_window: usize,
    /// Shared response history capacity (oldest evicted first).
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// Violations that latch a peer onto the blacklist.
    #[serde(default = "default_blacklist_threshold")]
    pub blacklist_threshold: u32,
}

fn default_ema_alpha() -> f64 {
    0.1
}

fn default_temperature() -> f64 {
    2.0
}

fn default_min_weight() -> f64 {
    0.001
}

fn default_stake_share() -> f64 {
    0.15
}

fn default_quality_share() -> f64 {
    0.75
}

fn default_history_share() -> f64 {
    0.10
}

fn default_history_window() -> usize {
    50
}

fn default_history_capacity() -> usize {
    1000
}

fn default_blacklist_threshold() -> u32 {
    3
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            ema_alpha: default_ema_alpha(),
            temperature: default_temperature(),
            min_weight: default_min_weight(),
            stake_share: default_stake_share(),
            quality_share: default_quality_share(),
            history_share: default_history_share(),
            history_window: default_history_window(),
            history_capacity: default_history_capacity(),
            blacklist_threshold: default_blacklist_threshold(),
        }
    }
}
