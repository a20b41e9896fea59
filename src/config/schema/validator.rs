use crate::protocol::TaskType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Seconds between validation steps.
    #[serde(default = "default_query_interval_secs")]
    pub query_interval_secs: u64,
    /// Per-peer response deadline within one dispatch batch.
    #[serde(default = "default_batch_timeout_secs")]
    pub batch_timeout_secs: u64,
    /// Peers queried per step.
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
    /// Share of the sample drawn from the top of the EMA ranking; the rest is explored at random.
    #[serde(default = "default_exploit_share")]
    pub exploit_share: f64,
    /// Steps between weight computations.
    #[serde(default = "default_weight_update_frequency")]
    pub weight_update_frequency: u64,
    #[serde(default)]
    pub task_distribution: TaskDistribution,
    /// Stop after this many steps (`None` runs until cancelled).
    #[serde(default)]
    pub max_steps: Option<u64>,
}

fn default_query_interval_secs() -> u64 {
    12
}

fn default_batch_timeout_secs() -> u64 {
    60
}

fn default_sample_size() -> usize {
    10
}

fn default_exploit_share() -> f64 {
    0.7
}

fn default_weight_update_frequency() -> u64 {
    100
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            query_interval_secs: default_query_interval_secs(),
            batch_timeout_secs: default_batch_timeout_secs(),
            sample_size: default_sample_size(),
            exploit_share: default_exploit_share(),
            weight_update_frequency: default_weight_update_frequency(),
            task_distribution: TaskDistribution::default(),
            max_steps: None,
        }
    }
}

/// Relative frequency of each task type. Values need not sum to one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskDistribution {
    pub blueprint: f64,
    pub characters: f64,
    pub story_arc: f64,
    pub chapters: f64,
}

impl Default for TaskDistribution {
    fn default() -> Self {
        Self {
            blueprint: 0.40,
            characters: 0.25,
            story_arc: 0.25,
            chapters: 0.10,
        }
    }
}

impl TaskDistribution {
    pub fn weight(&self, task_type: TaskType) -> f64 {
        match task_type {
            TaskType::Blueprint => self.blueprint,
            TaskType::Characters => self.characters,
            TaskType::StoryArc => self.story_arc,
            TaskType::Chapters => self.chapters,
        }
    }

    pub fn is_valid(&self) -> bool {
        let parts = [self.blueprint, self.characters, self.story_arc, self.chapters];
        parts.iter().all(|w| w.is_finite() && *w >= 0.0) && parts.iter().sum::<f64>() > 0.0
    }
}
