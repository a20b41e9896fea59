use super::breakdown::{ComponentScore, EvaluationStatus, ScoreBreakdown};
use super::content::ContentScorer;
use super::plagiarism::PlagiarismDetector;
use super::policy::{PolicyEngine, PolicyOutcome};
use super::structure::score_structure;
use super::technical::score_technical;
use crate::config::{Config, NARRATIVE_MAX, PointBudget};
use crate::narrative::{EvaluationMethod, NarrativeScorer};
use crate::protocol::{OutputData, TaskRequest, TaskResponse};
use crate::reputation::HistoryStore;
use std::sync::Arc;

/// Scores one response against its batch and the shared history.
///
/// Never fails: every degraded path still yields a [`ScoreBreakdown`] whose
/// status says what happened.
pub struct ScoringPipeline {
    budget: PointBudget,
    content: ContentScorer,
    plagiarism: PlagiarismDetector,
    policy: PolicyEngine,
    narrative: Option<Arc<NarrativeScorer>>,
}

impl ScoringPipeline {
    pub fn new(
        budget: PointBudget,
        content: ContentScorer,
        plagiarism: PlagiarismDetector,
        policy: PolicyEngine,
        narrative: Option<Arc<NarrativeScorer>>,
    ) -> Self {
        Self {
            budget,
            content,
            plagiarism,
            policy,
            narrative,
        }
    }

    /// A zero narrative budget skips the judge entirely.
    pub fn from_config(config: &Config) -> Self {
        let budget = config.scoring.budget;
        let narrative = (budget.narrative > 0.0)
            .then(|| Arc::new(NarrativeScorer::from_config(&config.narrative)));
        Self::new(
            budget,
            ContentScorer::new(config.scoring.content.clone()),
            PlagiarismDetector::new(config.scoring.plagiarism.clone()),
            PolicyEngine::new(config.policy.clone()),
            narrative,
        )
    }

    pub fn budget(&self) -> PointBudget {
        self.budget
    }

    pub fn narrative(&self) -> Option<&NarrativeScorer> {
        self.narrative.as_deref()
    }

    pub async fn score(
        &self,
        request: &TaskRequest,
        response: &TaskResponse,
        batch: &[TaskResponse],
        history: &HistoryStore,
    ) -> ScoreBreakdown {
        let Some(output) = response.output.as_ref().filter(|o| !o.is_empty()) else {
            return ScoreBreakdown::empty(EvaluationStatus::Absent);
        };
        if output.is_error_report() {
            tracing::debug!(
                peer = %response.responder,
                task_type = %request.task_type,
                "peer reported a generation failure"
            );
            return ScoreBreakdown::empty(EvaluationStatus::GenerationFailed);
        }

        let verdict = self.plagiarism.check(response, batch, history);
        if verdict.flagged {
            tracing::warn!(
                peer = %response.responder,
                task_type = %request.task_type,
                kind = ?verdict.kind,
                similarity = verdict.similarity,
                "plagiarism detected"
            );
            let mut breakdown = ScoreBreakdown::empty(EvaluationStatus::Plagiarized);
            breakdown.plagiarism = Some(verdict);
            return breakdown;
        }

        let task_type = request.task_type;
        let technical = score_technical(
            output,
            response.generation_time,
            task_type,
            task_type.required_output_fields(),
            self.budget.technical,
        );

        let OutputData::Structured(data) = output else {
            let mut breakdown = ScoreBreakdown::empty(EvaluationStatus::Malformed);
            breakdown.technical = technical;
            breakdown.plagiarism = Some(verdict);
            return breakdown;
        };

        let structure = score_structure(data, task_type, self.budget.structure);
        let content = self
            .content
            .score(data, request, history, self.budget.content);

        let mut narrative = ComponentScore::new(NARRATIVE_MAX);
        let mut narrative_detail = None;
        if self.budget.narrative > 0.0
            && let Some(scorer) = &self.narrative
        {
            let evaluation = scorer.evaluate(data, request).await;
            narrative.part("narrative_merit", evaluation.score);
            if !matches!(
                evaluation.method,
                EvaluationMethod::Judge | EvaluationMethod::Cached
            ) {
                narrative
                    .notes
                    .push(format!("narrative evaluation {}", evaluation.method));
            }
            narrative_detail = Some(evaluation);
        }
        let narrative = narrative.finish(self.budget.narrative);

        let base_score = (technical.points + structure.points + content.points + narrative.points)
            .clamp(0.0, 100.0);
        let adjustment = self.policy.apply(base_score, &response.model_info);
        let status = match adjustment.outcome {
            PolicyOutcome::Disqualified => EvaluationStatus::Disqualified,
            PolicyOutcome::BelowQualityFloor => EvaluationStatus::BelowQualityFloor,
            PolicyOutcome::Applied | PolicyOutcome::NoModelInfo => EvaluationStatus::Scored,
        };
        let total = adjustment.adjusted_score;

        tracing::debug!(
            peer = %response.responder,
            task_type = %task_type,
            base_score,
            total,
            %status,
            "response scored"
        );

        ScoreBreakdown {
            status,
            technical,
            structure,
            content,
            narrative,
            narrative_detail,
            base_score,
            plagiarism: Some(verdict),
            policy: Some(adjustment),
            total,
        }
    }
}
