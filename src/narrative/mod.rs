//! AI-judged narrative merit (0–30).
//!
//! The rubric lives in configuration, not in this crate, so peers cannot tune
//! their output against it. Judge failures degrade to a configured fallback
//! score and never abort the surrounding scoring.

pub mod cache;
pub mod extract;
pub mod parse;
pub mod prompt;

pub use cache::TtlCache;
pub use extract::extract_content;
pub use parse::parse_judge_reply;
pub use prompt::{DEFAULT_EVALUATION_PROMPT, render_prompt};

use crate::config::{DimensionWeights, NARRATIVE_MAX, NarrativeConfig};
use crate::judge::{Judge, create_judge};
use crate::protocol::{TaskRequest, TaskType};
use crate::scoring::similarity::content_hash;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

const DIMENSION_MAX: f64 = 5.0;
const MISSING_DIMENSION: f64 = 2.5;
const MAX_NOTES_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EvaluationMethod {
    Judge,
    Cached,
    /// Judge unreachable or its reply unparseable.
    Fallback,
    Disabled,
    InsufficientContent,
}

/// Judge's per-dimension scores, each clamped to [0, 5].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DimensionScores {
    pub narrative_flow: f64,
    pub emotional_impact: f64,
    pub creative_originality: f64,
    pub internal_consistency: f64,
}

impl DimensionScores {
    fn from_reply(reply: &Map<String, Value>) -> Self {
        let dim = |key: &str| {
            reply
                .get(key)
                .and_then(|v| v.as_f64().or_else(|| v.as_str()?.trim().parse().ok()))
                .filter(|v: &f64| v.is_finite())
                .unwrap_or(MISSING_DIMENSION)
                .clamp(0.0, DIMENSION_MAX)
        };
        Self {
            narrative_flow: dim("narrative_flow"),
            emotional_impact: dim("emotional_impact"),
            creative_originality: dim("creative_originality"),
            internal_consistency: dim("internal_consistency"),
        }
    }

    /// Weighted sum scaled so unit weights and perfect marks reach 30.
    pub fn weighted_total(&self, weights: &DimensionWeights) -> f64 {
        let scale = NARRATIVE_MAX / DIMENSION_MAX;
        let total = self.narrative_flow * weights.narrative_flow
            + self.emotional_impact * weights.emotional_impact
            + self.creative_originality * weights.creative_originality
            + self.internal_consistency * weights.internal_consistency;
        (total * scale).clamp(0.0, NARRATIVE_MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarrativeEvaluation {
    /// Score in [0, 30].
    pub score: f64,
    pub method: EvaluationMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<DimensionScores>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

impl NarrativeEvaluation {
    fn fixed(score: f64, method: EvaluationMethod) -> Self {
        Self {
            score: score.clamp(0.0, NARRATIVE_MAX),
            method,
            dimensions: None,
            notes: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NarrativeStats {
    pub total_evaluations: u64,
    pub cache_hits: u64,
    pub cache_hit_rate: f64,
    pub judge_errors: u64,
    pub fallbacks: u64,
    pub cache_size: usize,
}

pub struct NarrativeScorer {
    config: NarrativeConfig,
    judge: Option<Box<dyn Judge>>,
    template: String,
    cache: Mutex<TtlCache<NarrativeEvaluation>>,
    total_evaluations: AtomicU64,
    cache_hits: AtomicU64,
    judge_errors: AtomicU64,
    fallbacks: AtomicU64,
}

impl NarrativeScorer {
    pub fn new(config: NarrativeConfig, judge: Option<Box<dyn Judge>>) -> Self {
        let template = config
            .evaluation_prompt
            .clone()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_EVALUATION_PROMPT.to_string());
        let cache = TtlCache::new(
            Duration::from_secs(config.cache_ttl_secs),
            config.cache_capacity,
        );
        Self {
            config,
            judge,
            template,
            cache: Mutex::new(cache),
            total_evaluations: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            judge_errors: AtomicU64::new(0),
            fallbacks: AtomicU64::new(0),
        }
    }

    /// Builds the configured judge; a broken judge configuration disables judging.
    pub fn from_config(config: &NarrativeConfig) -> Self {
        let judge = create_judge(config).unwrap_or_else(|e| {
            tracing::warn!("narrative judge unavailable, using fallback scores: {e}");
            None
        });
        if let Some(judge) = &judge {
            tracing::info!(judge = judge.name(), "narrative judge ready");
        }
        Self::new(config.clone(), judge)
    }

    pub fn is_judging(&self) -> bool {
        self.config.enabled && self.judge.is_some()
    }

    pub async fn evaluate(
        &self,
        data: &Map<String, Value>,
        request: &TaskRequest,
    ) -> NarrativeEvaluation {
        self.total_evaluations.fetch_add(1, Ordering::Relaxed);

        let Some(judge) = self.judge.as_ref().filter(|_| self.config.enabled) else {
            return NarrativeEvaluation::fixed(self.config.fallback_score, EvaluationMethod::Disabled);
        };

        let content = extract_content(data, request.task_type);
        if content.chars().count() < self.config.min_content_chars {
            return NarrativeEvaluation::fixed(
                self.config.insufficient_score,
                EvaluationMethod::InsufficientContent,
            );
        }

        let key = content_hash(&content);
        if let Some(cached) = self.cached(&key) {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            return NarrativeEvaluation {
                method: EvaluationMethod::Cached,
                ..cached
            };
        }

        let prompt = render_prompt(
            &self.template,
            &content,
            &judge_context(request),
            self.config.max_content_chars,
            self.config.max_context_chars,
        );

        let reply = match judge.evaluate(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                self.judge_errors.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(judge = judge.name(), task_type = %request.task_type, "narrative judge degraded: {e}");
                return self.fallback();
            }
        };

        let Some(parsed) = parse_judge_reply(&reply) else {
            tracing::warn!(judge = judge.name(), task_type = %request.task_type, "narrative judge reply was not parseable");
            return self.fallback();
        };

        let dimensions = DimensionScores::from_reply(&parsed);
        let notes = parsed
            .get("brief_notes")
            .and_then(Value::as_str)
            .map(|n| prompt::truncate_chars(n, MAX_NOTES_CHARS).to_string())
            .unwrap_or_default();
        let evaluation = NarrativeEvaluation {
            score: dimensions.weighted_total(&self.config.weights),
            method: EvaluationMethod::Judge,
            dimensions: Some(dimensions),
            notes,
        };

        if self.config.cache_enabled
            && let Ok(mut cache) = self.cache.lock()
        {
            cache.insert(key, evaluation.clone());
        }
        evaluation
    }

    fn cached(&self, key: &str) -> Option<NarrativeEvaluation> {
        if !self.config.cache_enabled {
            return None;
        }
        self.cache.lock().ok()?.get(key)
    }

    fn fallback(&self) -> NarrativeEvaluation {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
        NarrativeEvaluation::fixed(self.config.fallback_score, EvaluationMethod::Fallback)
    }

    pub fn stats(&self) -> NarrativeStats {
        let total = self.total_evaluations.load(Ordering::Relaxed);
        let hits = self.cache_hits.load(Ordering::Relaxed);
        #[allow(clippy::cast_precision_loss)]
        let cache_hit_rate = hits as f64 / total.max(1) as f64;
        NarrativeStats {
            total_evaluations: total,
            cache_hits: hits,
            cache_hit_rate,
            judge_errors: self.judge_errors.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            cache_size: self.cache.lock().map(|c| c.len()).unwrap_or_default(),
        }
    }
}

/// What the judge sees besides the content: the request and its upstream blueprint.
fn judge_context(request: &TaskRequest) -> Value {
    let mut context = json!({
        "task_type": request.task_type,
        "user_input": request.user_input,
    });
    if request.task_type != TaskType::Blueprint
        && let Some(blueprint) = &request.blueprint
    {
        context["blueprint"] = blueprint.clone();
    }
    context
}
