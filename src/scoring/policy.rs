//! Declared-model quality policy.
//!
//! Peers self-report how they generated content. The policy adjusts the base
//! score from that declaration: undeclared models are penalized, blacklisted
//! names are disqualified, and per-mode and recommended-model multipliers are
//! layered on top.

use crate::protocol::{GenerationMode, ModelInfo};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPolicy {
    /// Fraction of the maximum base score below which a response earns nothing.
    #[serde(default)]
    pub min_quality_score: f64,
    /// Mode name (`local`, `api`, `vllm`, `custom`, `mock`) to multiplier. Unlisted modes score at parity.
    #[serde(default)]
    pub mode_multipliers: BTreeMap<String, f64>,
    #[serde(default)]
    pub recommended_models: Vec<RecommendedModel>,
    /// Case-insensitive substrings of disqualified model names.
    #[serde(default)]
    pub blacklisted_models: Vec<String>,
    #[serde(default = "default_no_model_info_penalty")]
    pub no_model_info_penalty: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedModel {
    /// Case-insensitive substring of the declared model name.
    pub name: String,
    pub bonus: f64,
}

fn default_no_model_info_penalty() -> f64 {
    0.5
}

impl Default for ModelPolicy {
    fn default() -> Self {
        Self {
            min_quality_score: 0.0,
            mode_multipliers: BTreeMap::new(),
            recommended_models: Vec::new(),
            blacklisted_models: Vec::new(),
            no_model_info_penalty: default_no_model_info_penalty(),
        }
    }
}

impl ModelPolicy {
    pub fn mode_multiplier(&self, mode: GenerationMode) -> f64 {
        self.mode_multipliers
            .get(mode.as_ref())
            .copied()
            .unwrap_or(1.0)
    }

    /// Messages describing values that cannot be applied as written.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if !(0.0..=1.0).contains(&self.min_quality_score) {
            problems.push(format!(
                "min_quality_score {} outside [0, 1]",
                self.min_quality_score
            ));
        }
        if !self.no_model_info_penalty.is_finite() || self.no_model_info_penalty < 0.0 {
            problems.push(format!(
                "no_model_info_penalty {} must be non-negative",
                self.no_model_info_penalty
            ));
        }
        for (mode, multiplier) in &self.mode_multipliers {
            if mode.parse::<GenerationMode>().is_err() {
                problems.push(format!("unknown mode '{mode}' in mode_multipliers"));
            }
            if !multiplier.is_finite() || *multiplier < 0.0 {
                problems.push(format!("multiplier for '{mode}' must be non-negative"));
            }
        }
        for model in &self.recommended_models {
            if !model.bonus.is_finite() || model.bonus < 0.0 {
                problems.push(format!("bonus for '{}' must be non-negative", model.name));
            }
        }
        problems
    }
}

/// Why the policy produced its multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyOutcome {
    Applied,
    NoModelInfo,
    Disqualified,
    BelowQualityFloor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyAdjustment {
    pub outcome: PolicyOutcome,
    pub mode_multiplier: f64,
    pub model_bonus: f64,
    pub final_multiplier: f64,
    pub adjusted_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<String>,
}

impl PolicyAdjustment {
    fn zero(outcome: PolicyOutcome, matched: Option<String>) -> Self {
        Self {
            outcome,
            mode_multiplier: 0.0,
            model_bonus: 0.0,
            final_multiplier: 0.0,
            adjusted_score: 0.0,
            matched,
        }
    }
}

pub struct PolicyEngine {
    policy: ModelPolicy,
}

impl PolicyEngine {
    pub fn new(policy: ModelPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ModelPolicy {
        &self.policy
    }

    /// Adjusts a 0–100 base score for the declared model.
    pub fn apply(&self, base_score: f64, info: &ModelInfo) -> PolicyAdjustment {
        let base_score = base_score.clamp(0.0, 100.0);

        let mode = match info.mode {
            Some(mode) if info.is_declared() => mode,
            _ => {
                let penalty = self.policy.no_model_info_penalty;
                return PolicyAdjustment {
                    outcome: PolicyOutcome::NoModelInfo,
                    mode_multiplier: penalty,
                    model_bonus: 1.0,
                    final_multiplier: penalty,
                    adjusted_score: (base_score * penalty).clamp(0.0, 100.0),
                    matched: None,
                };
            }
        };

        let name = info.name.as_deref().unwrap_or_default().to_lowercase();

        if let Some(hit) = self
            .policy
            .blacklisted_models
            .iter()
            .find(|pattern| !pattern.is_empty() && name.contains(&pattern.to_lowercase()))
        {
            return PolicyAdjustment::zero(PolicyOutcome::Disqualified, Some(hit.clone()));
        }

        if base_score / 100.0 < self.policy.min_quality_score {
            return PolicyAdjustment::zero(PolicyOutcome::BelowQualityFloor, None);
        }

        let mode_multiplier = self.policy.mode_multiplier(mode);
        let recommended = self
            .policy
            .recommended_models
            .iter()
            .find(|model| !model.name.is_empty() && name.contains(&model.name.to_lowercase()));
        let model_bonus = recommended.map_or(1.0, |model| model.bonus);
        let final_multiplier = mode_multiplier * model_bonus;

        PolicyAdjustment {
            outcome: PolicyOutcome::Applied,
            mode_multiplier,
            model_bonus,
            final_multiplier,
            adjusted_score: (base_score * final_multiplier).clamp(0.0, 100.0),
            matched: recommended.map(|model| model.name.clone()),
        }
    }
}
