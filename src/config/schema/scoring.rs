use serde::{Deserialize, Serialize};

/// Native maxima of the four sub-scorers before budget scaling.
pub const TECHNICAL_MAX: f64 = 30.0;
pub const STRUCTURE_MAX: f64 = 40.0;
pub const CONTENT_MAX: f64 = 30.0;
pub const NARRATIVE_MAX: f64 = 30.0;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub budget: PointBudget,

    #[serde(default)]
    pub content: ContentConfig,

    #[serde(default)]
    pub plagiarism: PlagiarismConfig,
}

/// Points each sub-scorer contributes to the 0–100 base score.
///
/// Sub-scorers report in their native ranges; `points = raw / native_max * budget`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointBudget {
    #[serde(default = "default_technical_points")]
    pub technical: f64,
    #[serde(default = "default_structure_points")]
    pub structure: f64,
    #[serde(default = "default_content_points")]
    pub content: f64,
    #[serde(default = "default_narrative_points")]
    pub narrative: f64,
}

fn default_technical_points() -> f64 {
    20.0
}

fn default_structure_points() -> f64 {
    30.0
}

fn default_content_points() -> f64 {
    20.0
}

fn default_narrative_points() -> f64 {
    30.0
}

impl Default for PointBudget {
    fn default() -> Self {
        Self {
            technical: default_technical_points(),
            structure: default_structure_points(),
            content: default_content_points(),
            narrative: default_narrative_points(),
        }
    }
}

impl PointBudget {
    /// The pre-narrative allocation: 30 / 40 / 30 / 0.
    pub fn legacy() -> Self {
        Self {
            technical: TECHNICAL_MAX,
            structure: STRUCTURE_MAX,
            content: CONTENT_MAX,
            narrative: 0.0,
        }
    }

    pub fn total(&self) -> f64 {
        self.technical + self.structure + self.content + self.narrative
    }

    pub fn is_valid(&self) -> bool {
        let parts = [self.technical, self.structure, self.content, self.narrative];
        parts.iter().all(|p| p.is_finite() && *p >= 0.0) && self.total() <= 100.0 + 1e-9
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Swap keyword relevance for embedding similarity once an embedder exists.
    #[serde(default)]
    pub use_embeddings: bool,
    /// History entries checked for exact duplicates.
    #[serde(default = "default_duplicate_window")]
    pub duplicate_window: usize,
    /// History entries checked for near-duplicates.
    #[serde(default = "default_similarity_window")]
    pub similarity_window: usize,
}

fn default_duplicate_window() -> usize {
    100
}

fn default_similarity_window() -> usize {
    20
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            use_embeddings: false,
            duplicate_window: default_duplicate_window(),
            similarity_window: default_similarity_window(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlagiarismConfig {
    #[serde(default = "default_cross_peer_threshold")]
    pub cross_peer_threshold: f64,
    #[serde(default = "default_history_threshold")]
    pub history_threshold: f64,
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

fn default_cross_peer_threshold() -> f64 {
    0.95
}

fn default_history_threshold() -> f64 {
    0.90
}

fn default_history_window() -> usize {
    50
}

impl Default for PlagiarismConfig {
    fn default() -> Self {
        Self {
            cross_peer_threshold: default_cross_peer_threshold(),
            history_threshold: default_history_threshold(),
            history_window: default_history_window(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_budget_fills_one_hundred_points() {
        let budget = PointBudget::default();
        assert!((budget.total() - 100.0).abs() < 1e-9);
        assert!(budget.is_valid());
    }

    #[test]
    fn legacy_budget_has_no_narrative() {
        let budget = PointBudget::legacy();
        assert!(budget.narrative.abs() < f64::EPSILON);
        assert!(budget.is_valid());
    }

    #[test]
    fn oversized_budget_is_invalid() {
        let budget = PointBudget {
            technical: 30.0,
            structure: 40.0,
            content: 30.0,
            narrative: 30.0,
        };
        assert!(!budget.is_valid());
    }
}
