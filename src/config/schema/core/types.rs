use super::super::{
    GeneratorConfig, NarrativeConfig, ObservabilityConfig, ReputationConfig, ScoringConfig,
    ValidatorConfig,
};
use crate::scoring::policy::ModelPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Path the config was loaded from - computed, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Separate model-policy file; replaces the inline `[policy]` section when readable.
    #[serde(default)]
    pub policy_path: Option<PathBuf>,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub narrative: NarrativeConfig,

    #[serde(default)]
    pub policy: ModelPolicy,

    #[serde(default)]
    pub reputation: ReputationConfig,

    #[serde(default)]
    pub validator: ValidatorConfig,

    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Repairs values that cannot be applied, returning one message per repair.
    pub fn sanitize(&mut self) -> Vec<String> {
        let mut repairs = Vec::new();

        if !self.scoring.budget.is_valid() {
            repairs.push(format!(
                "scoring.budget totals {} (max 100); using defaults",
                self.scoring.budget.total()
            ));
            self.scoring.budget = Default::default();
        }

        if !self.narrative.weights.is_valid() {
            repairs.push("narrative.weights invalid; using defaults".into());
            self.narrative.weights = Default::default();
        }
        if !(0.0..=2.0).contains(&self.narrative.temperature) {
            repairs.push(format!(
                "narrative.temperature {} outside [0, 2]; using 0.3",
                self.narrative.temperature
            ));
            self.narrative.temperature = 0.3;
        }
        if self.narrative.cache_capacity == 0 {
            repairs.push("narrative.cache_capacity must be positive; using 1000".into());
            self.narrative.cache_capacity = 1000;
        }

        let policy_problems = self.policy.problems();
        if !policy_problems.is_empty() {
            repairs.push(format!(
                "policy rejected ({}); using permissive defaults",
                policy_problems.join("; ")
            ));
            self.policy = ModelPolicy::default();
        }

        let reputation = &mut self.reputation;
        if !(reputation.ema_alpha > 0.0 && reputation.ema_alpha <= 1.0) {
            repairs.push(format!(
                "reputation.ema_alpha {} outside (0, 1]; using 0.1",
                reputation.ema_alpha
            ));
            reputation.ema_alpha = 0.1;
        }
        if !(reputation.temperature.is_finite() && reputation.temperature > 0.0) {
            repairs.push(format!(
                "reputation.temperature {} must be positive; using 2.0",
                reputation.temperature
            ));
            reputation.temperature = 2.0;
        }
        if !(0.0..1.0).contains(&reputation.min_weight) {
            repairs.push(format!(
                "reputation.min_weight {} outside [0, 1); using 0.001",
                reputation.min_weight
            ));
            reputation.min_weight = 0.001;
        }
        let shares = [
            reputation.stake_share,
            reputation.quality_share,
            reputation.history_share,
        ];
        if shares.iter().any(|s| !s.is_finite() || *s < 0.0) {
            repairs.push("reputation composite shares must be non-negative; using defaults".into());
            let defaults = ReputationConfig::default();
            reputation.stake_share = defaults.stake_share;
            reputation.quality_share = defaults.quality_share;
            reputation.history_share = defaults.history_share;
        }
        if reputation.blacklist_threshold == 0 {
            repairs.push("reputation.blacklist_threshold must be positive; using 3".into());
            reputation.blacklist_threshold = 3;
        }
        if reputation.history_capacity == 0 {
            repairs.push("reputation.history_capacity must be positive; using 1000".into());
            reputation.history_capacity = 1000;
        }

        let validator = &mut self.validator;
        if !(0.0..=1.0).contains(&validator.exploit_share) {
            repairs.push(format!(
                "validator.exploit_share {} outside [0, 1]; using 0.7",
                validator.exploit_share
            ));
            validator.exploit_share = 0.7;
        }
        if !validator.task_distribution.is_valid() {
            repairs.push("validator.task_distribution invalid; using defaults".into());
            validator.task_distribution = Default::default();
        }
        if validator.weight_update_frequency == 0 {
            repairs.push("validator.weight_update_frequency must be positive; using 100".into());
            validator.weight_update_frequency = 100;
        }

        repairs
    }
}
