use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use storyfi::Config;
use storyfi::peer::{HttpPeerClient, Peer, StaticRegistry};
use storyfi::protocol::{PeerId, TaskRequest};
use storyfi::scoring::EvaluationStatus;
use storyfi::validator::{MemoryWeightSink, Validator};

use crate::fixtures::rich_blueprint;

#[tokio::test]
async fn remote_peers_are_scored_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/task"))
        .and(body_partial_json(json!({"task_type": "blueprint"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "output_data": rich_blueprint().to_string(),
            "generation_time": 4.0,
            "model_info": {"mode": "local", "name": "qwen2.5-7b"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let roster = vec![
        Peer::new("remote", 0, 100.0).with_address(server.uri()),
        Peer::new("offline", 1, 100.0),
    ];
    let mut config = Config::default();
    config.validator.weight_update_frequency = 1;
    let sink = Arc::new(MemoryWeightSink::new());
    let mut validator = Validator::new(
        &config,
        Arc::new(StaticRegistry::new(roster)),
        Arc::new(HttpPeerClient::new(5)),
    )
    .with_seed(1)
    .with_sink(Box::new(sink.clone()));

    let report = validator
        .step_with(TaskRequest::blueprint("a lantern keeper's last night"))
        .await
        .unwrap();

    let status = |id: &str| {
        report
            .scores
            .iter()
            .find(|(peer, _)| peer.as_str() == id)
            .map(|(_, b)| b.status)
    };
    assert_eq!(status("remote"), Some(EvaluationStatus::Scored));
    assert_eq!(status("offline"), Some(EvaluationStatus::Absent));

    let weights = report.weights.unwrap();
    assert!(weights[&PeerId::new("remote")] > weights[&PeerId::new("offline")]);
    assert_eq!(sink.submissions().len(), 1);
    server.verify().await;
}
