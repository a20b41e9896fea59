use std::collections::BTreeMap;

use serde_json::Value;
use storyfi::config::{ContentConfig, PlagiarismConfig, PointBudget};
use storyfi::protocol::{ModelInfo, TaskRequest, TaskType};
use storyfi::reputation::HistoryStore;
use storyfi::scoring::{
    ContentScorer, EvaluationStatus, ModelPolicy, PlagiarismDetector, PolicyEngine, PolicyOutcome,
    ScoringPipeline, score_structure,
};

use crate::fixtures::{local_model, perfect_blueprint, response, rich_blueprint, story_arc};

fn pipeline(policy: ModelPolicy) -> ScoringPipeline {
    ScoringPipeline::new(
        PointBudget::default(),
        ContentScorer::new(ContentConfig::default()),
        PlagiarismDetector::new(PlagiarismConfig::default()),
        PolicyEngine::new(policy),
        None,
    )
}

#[tokio::test]
async fn perfect_blueprint_earns_full_technical_credit() {
    let request = TaskRequest::blueprint("a story");
    let response = response("p1", TaskType::Blueprint, perfect_blueprint(), local_model());
    let result = pipeline(ModelPolicy::default())
        .score(&request, &response, &[], &HistoryStore::new(10))
        .await;

    assert_eq!(result.status, EvaluationStatus::Scored);
    assert!((result.technical.raw - 30.0).abs() < 1e-9);
    assert!((result.technical.parts["json_valid"] - 10.0).abs() < 1e-9);
    assert!((result.technical.parts["schema_complete"] - 10.0).abs() < 1e-9);
    assert!((result.technical.parts["response_time"] - 10.0).abs() < 1e-9);
    // Default budget gives technical 20 points.
    assert!((result.technical.points - 20.0).abs() < 1e-9);
}

#[test]
fn repeated_progress_value_is_one_violation() {
    let arc = story_arc(|chapters| {
        let sixth = chapters[5]["storyProgress"].clone();
        chapters[6]["storyProgress"] = sixth;
    });
    let Value::Object(data) = arc else {
        unreachable!()
    };
    let component = score_structure(&data, TaskType::StoryArc, 40.0);
    let expected = 10.0 * (1.0 - 1.0 / 12.0);
    assert!((component.parts["progress_monotonic"] - expected).abs() < 1e-9);
    assert!(component.notes.iter().any(|n| n.contains("1 storyProgress")));
}

#[tokio::test]
async fn blacklisted_model_is_disqualified_regardless_of_quality() {
    let policy = ModelPolicy {
        blacklisted_models: vec!["gpt-3.5".into()],
        ..ModelPolicy::default()
    };
    let request = TaskRequest::blueprint("a harbor of lanterns");
    let mut info = local_model();
    info.name = Some("GPT-3.5-turbo".into());
    let response = response("p1", TaskType::Blueprint, rich_blueprint(), info);

    let result = pipeline(policy)
        .score(&request, &response, &[], &HistoryStore::new(10))
        .await;
    assert_eq!(result.status, EvaluationStatus::Disqualified);
    assert!(result.base_score > 0.0);
    assert!(result.total.abs() < f64::EPSILON);
    let adjustment = result.policy.unwrap();
    assert_eq!(adjustment.outcome, PolicyOutcome::Disqualified);
    assert_eq!(adjustment.matched.as_deref(), Some("gpt-3.5"));
}

#[tokio::test]
async fn missing_model_info_is_penalized_not_zeroed() {
    let request = TaskRequest::blueprint("a harbor of lanterns");
    let response = response("p1", TaskType::Blueprint, rich_blueprint(), ModelInfo::default());
    let result = pipeline(ModelPolicy::default())
        .score(&request, &response, &[], &HistoryStore::new(10))
        .await;

    assert_eq!(result.status, EvaluationStatus::Scored);
    assert!(result.total > 0.0);
    assert!((result.total - result.base_score * 0.5).abs() < 1e-9);
    assert_eq!(result.policy.unwrap().outcome, PolicyOutcome::NoModelInfo);
}

#[tokio::test]
async fn recommended_model_bonus_is_capped_at_one_hundred() {
    let policy = ModelPolicy {
        mode_multipliers: BTreeMap::from([("local".into(), 1.5)]),
        recommended_models: vec![storyfi::scoring::RecommendedModel {
            name: "qwen".into(),
            bonus: 2.0,
        }],
        ..ModelPolicy::default()
    };
    let request = TaskRequest::blueprint("a harbor of lanterns");
    let response = response("p1", TaskType::Blueprint, rich_blueprint(), local_model());
    let result = pipeline(policy)
        .score(&request, &response, &[], &HistoryStore::new(10))
        .await;
    assert!(result.total <= 100.0);
    assert!(result.total >= result.base_score);
}

#[tokio::test]
async fn history_reuse_is_flagged_as_template_reuse() {
    let request = TaskRequest::blueprint("a harbor of lanterns");
    let earlier = response("p1", TaskType::Blueprint, rich_blueprint(), local_model());
    let mut history = HistoryStore::new(10);
    history.record(
        earlier.responder.clone(),
        TaskType::Blueprint,
        earlier.output.as_ref().unwrap(),
        70.0,
    );

    let reused = response("p2", TaskType::Blueprint, rich_blueprint(), local_model());
    let result = pipeline(ModelPolicy::default())
        .score(&request, &reused, std::slice::from_ref(&reused), &history)
        .await;
    assert_eq!(result.status, EvaluationStatus::Plagiarized);
    assert!(result.total.abs() < f64::EPSILON);
    let verdict = result.plagiarism.unwrap();
    assert!((verdict.similarity - 1.0).abs() < 1e-9);
}
