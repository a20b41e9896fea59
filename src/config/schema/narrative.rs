use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// "none" | "openai" | "zhipu" | "ollama" | "custom" | "compatible:<base url>"
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default)]
    pub model: Option<String>,
    /// Overrides the backend's default base URL (or the custom endpoint URL).
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Extra headers sent to a custom endpoint.
    #[serde(default)]
    pub custom_headers: BTreeMap<String, String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default)]
    pub weights: DimensionWeights,
    /// Score returned when the judge is disabled, unreachable or unparseable.
    #[serde(default = "default_fallback_score")]
    pub fallback_score: f64,
    /// Score returned when there is too little text to judge.
    #[serde(default = "default_insufficient_score")]
    pub insufficient_score: f64,
    #[serde(default = "default_min_content_chars")]
    pub min_content_chars: usize,
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
    #[serde(default = "default_true")]
    pub cache_enabled: bool,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    /// Server-side rubric file; keeps prompt wording out of the repository.
    #[serde(default)]
    pub prompt_path: Option<PathBuf>,
    /// Inline rubric, used when no prompt file is configured.
    #[serde(default)]
    pub evaluation_prompt: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_backend() -> String {
    "none".into()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    2
}

fn default_backoff_ms() -> u64 {
    500
}

fn default_temperature() -> f64 {
    0.3
}

fn default_fallback_score() -> f64 {
    10.0
}

fn default_insufficient_score() -> f64 {
    5.0
}

fn default_min_content_chars() -> usize {
    50
}

fn default_max_content_chars() -> usize {
    3000
}

fn default_max_context_chars() -> usize {
    1000
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_cache_capacity() -> usize {
    1000
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: default_backend(),
            model: None,
            base_url: None,
            api_key: None,
            custom_headers: BTreeMap::new(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
            temperature: default_temperature(),
            weights: DimensionWeights::default(),
            fallback_score: default_fallback_score(),
            insufficient_score: default_insufficient_score(),
            min_content_chars: default_min_content_chars(),
            max_content_chars: default_max_content_chars(),
            max_context_chars: default_max_context_chars(),
            cache_enabled: true,
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_capacity: default_cache_capacity(),
            prompt_path: None,
            evaluation_prompt: None,
        }
    }
}

/// Relative weight of each judged dimension. Weights summing to 1.0 give a 30-point maximum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionWeights {
    pub narrative_flow: f64,
    pub emotional_impact: f64,
    pub creative_originality: f64,
    pub internal_consistency: f64,
}

impl Default for DimensionWeights {
    fn default() -> Self {
        Self {
            narrative_flow: 0.30,
            emotional_impact: 0.25,
            creative_originality: 0.25,
            internal_consistency: 0.20,
        }
    }
}

impl DimensionWeights {
    pub fn sum(&self) -> f64 {
        self.narrative_flow + self.emotional_impact + self.creative_originality + self.internal_consistency
    }

    pub fn is_valid(&self) -> bool {
        let parts = [
            self.narrative_flow,
            self.emotional_impact,
            self.creative_originality,
            self.internal_consistency,
        ];
        parts.iter().all(|w| w.is_finite() && *w >= 0.0) && self.sum() > 0.0
    }
}
