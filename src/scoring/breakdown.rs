use super::plagiarism::PlagiarismVerdict;
use super::policy::PolicyAdjustment;
use crate::narrative::NarrativeEvaluation;
use serde::Serialize;
use std::collections::BTreeMap;

/// How a response's evaluation ended. Lets operators tell "scored low" from
/// "never scored".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EvaluationStatus {
    Scored,
    /// Output was not a JSON object.
    Malformed,
    /// No reply within the batch deadline, or an empty one.
    Absent,
    /// The peer answered with its own error report instead of output.
    GenerationFailed,
    Plagiarized,
    /// Declared model matched the policy blacklist.
    Disqualified,
    BelowQualityFloor,
}

/// One sub-scorer's result: its native score and the points it contributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComponentScore {
    /// Score in the sub-scorer's native range.
    pub raw: f64,
    /// Native maximum.
    pub max: f64,
    /// Contribution to the 0–100 base score after budget scaling.
    pub points: f64,
    pub parts: BTreeMap<&'static str, f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl ComponentScore {
    pub fn new(max: f64) -> Self {
        Self {
            max,
            ..Self::default()
        }
    }

    pub fn part(&mut self, name: &'static str, value: f64) {
        self.parts.insert(name, value);
    }

    /// Clamps the parts' sum to the native max and scales it into `budget` points.
    pub fn finish(mut self, budget: f64) -> Self {
        self.raw = self.parts.values().sum::<f64>().clamp(0.0, self.max);
        self.points = if self.max > 0.0 {
            self.raw / self.max * budget
        } else {
            0.0
        };
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub status: EvaluationStatus,
    pub technical: ComponentScore,
    pub structure: ComponentScore,
    pub content: ComponentScore,
    pub narrative: ComponentScore,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative_detail: Option<NarrativeEvaluation>,
    /// Sum of component points, before plagiarism and policy.
    pub base_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plagiarism: Option<PlagiarismVerdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<PolicyAdjustment>,
    /// Final score in [0, 100].
    pub total: f64,
}

impl ScoreBreakdown {
    pub(crate) fn empty(status: EvaluationStatus) -> Self {
        Self {
            status,
            technical: ComponentScore::default(),
            structure: ComponentScore::default(),
            content: ComponentScore::default(),
            narrative: ComponentScore::default(),
            narrative_detail: None,
            base_score: 0.0,
            plagiarism: None,
            policy: None,
            total: 0.0,
        }
    }

    pub fn is_flagged(&self) -> bool {
        self.status == EvaluationStatus::Plagiarized
    }
}
