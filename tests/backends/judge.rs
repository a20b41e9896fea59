use serde_json::{Map, Value, json};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use storyfi::config::NarrativeConfig;
use storyfi::narrative::{EvaluationMethod, NarrativeScorer};
use storyfi::protocol::TaskRequest;

use crate::fixtures::rich_blueprint;

fn blueprint_map() -> Map<String, Value> {
    match rich_blueprint() {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

fn fast_retries(config: NarrativeConfig) -> NarrativeConfig {
    NarrativeConfig {
        max_retries: 1,
        backoff_ms: 1,
        timeout_secs: 5,
        ..config
    }
}

#[tokio::test]
async fn openai_compatible_judge_scores_and_caches() {
    let server = MockServer::start().await;
    let reply = "Here you go:\n```json\n{\"narrative_flow\": 4, \"emotional_impact\": 4, \"creative_originality\": 4, \"internal_consistency\": 4, \"brief_notes\": \"solid\"}\n```";

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer judge-key"))
        .and(body_partial_json(json!({"model": "judge-model", "temperature": 0.3})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": reply}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = fast_retries(NarrativeConfig {
        backend: "openai".into(),
        base_url: Some(server.uri()),
        api_key: Some("judge-key".into()),
        model: Some("judge-model".into()),
        ..NarrativeConfig::default()
    });
    let scorer = NarrativeScorer::from_config(&config);
    assert!(scorer.is_judging());

    let request = TaskRequest::blueprint("a harbor of lanterns");
    let first = scorer.evaluate(&blueprint_map(), &request).await;
    assert_eq!(first.method, EvaluationMethod::Judge);
    // Weights sum to 1.0, so uniform 4/5 marks give 24 of 30.
    assert!((first.score - 24.0).abs() < 1e-9);
    assert_eq!(first.notes, "solid");

    let second = scorer.evaluate(&blueprint_map(), &request).await;
    assert_eq!(second.method, EvaluationMethod::Cached);
    assert!((second.score - first.score).abs() < f64::EPSILON);

    let stats = scorer.stats();
    assert_eq!(stats.total_evaluations, 2);
    assert_eq!(stats.cache_hits, 1);
    assert_eq!(stats.cache_size, 1);
    server.verify().await;
}

#[tokio::test]
async fn custom_judge_reads_the_response_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/eval"))
        .and(header("x-judge-token", "t0k"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "{\"narrative_flow\": 5, \"emotional_impact\": 5, \"creative_originality\": 5, \"internal_consistency\": 5}"
        })))
        .mount(&server)
        .await;

    let config = fast_retries(NarrativeConfig {
        backend: "custom".into(),
        base_url: Some(format!("{}/eval", server.uri())),
        custom_headers: [("x-judge-token".to_string(), "t0k".to_string())].into(),
        ..NarrativeConfig::default()
    });
    let scorer = NarrativeScorer::from_config(&config);
    let result = scorer
        .evaluate(&blueprint_map(), &TaskRequest::blueprint("x"))
        .await;
    assert_eq!(result.method, EvaluationMethod::Judge);
    assert!((result.score - 30.0).abs() < 1e-9);
}

#[tokio::test]
async fn failing_judge_degrades_to_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(2)
        .mount(&server)
        .await;

    let config = fast_retries(NarrativeConfig {
        backend: "custom".into(),
        base_url: Some(server.uri()),
        ..NarrativeConfig::default()
    });
    let scorer = NarrativeScorer::from_config(&config);
    let result = scorer
        .evaluate(&blueprint_map(), &TaskRequest::blueprint("x"))
        .await;

    assert_eq!(result.method, EvaluationMethod::Fallback);
    assert!((result.score - config.fallback_score).abs() < f64::EPSILON);
    let stats = scorer.stats();
    assert_eq!(stats.judge_errors, 1);
    assert_eq!(stats.fallbacks, 1);
    server.verify().await;
}

#[tokio::test]
async fn unparseable_reply_falls_back_without_caching() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("I liked it a lot."))
        .mount(&server)
        .await;

    let config = fast_retries(NarrativeConfig {
        backend: "custom".into(),
        base_url: Some(server.uri()),
        ..NarrativeConfig::default()
    });
    let scorer = NarrativeScorer::from_config(&config);
    let result = scorer
        .evaluate(&blueprint_map(), &TaskRequest::blueprint("x"))
        .await;
    assert_eq!(result.method, EvaluationMethod::Fallback);
    assert_eq!(scorer.stats().cache_size, 0);
}
