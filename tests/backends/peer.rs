use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use storyfi::peer::{HttpPeerClient, Peer, PeerClient};
use storyfi::protocol::{GenerationMode, OutputData, TaskRequest};

#[tokio::test]
async fn loosely_typed_reply_is_normalized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/task"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "output_data": "{\"title\": \"Ashfall\"}",
            "generation_time": "3.5",
            "declared_model_info": {"mode": "API", "name": "gpt-4o-mini"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let peer = Peer::new("remote", 3, 50.0).with_address(server.uri());
    let response = HttpPeerClient::new(5)
        .query(&peer, &TaskRequest::blueprint("volcano town"))
        .await
        .unwrap();

    assert_eq!(response.responder.as_str(), "remote");
    let output = response.output.as_ref().and_then(OutputData::as_object).unwrap();
    assert_eq!(output["title"], "Ashfall");
    assert!((response.generation_time - 3.5).abs() < 1e-9);
    assert_eq!(response.model_info.mode, Some(GenerationMode::Api));
    server.verify().await;
}

#[tokio::test]
async fn bare_list_output_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "output_data": [{"title": "x"}]
        })))
        .mount(&server)
        .await;

    let peer = Peer::new("remote", 3, 50.0).with_address(server.uri());
    let response = HttpPeerClient::new(5)
        .query(&peer, &TaskRequest::blueprint("x"))
        .await
        .unwrap();
    assert!(response.output.as_ref().is_some_and(OutputData::is_malformed));
}

#[tokio::test]
async fn server_error_is_a_failed_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let peer = Peer::new("remote", 3, 50.0).with_address(server.uri());
    assert!(
        HttpPeerClient::new(5)
            .query(&peer, &TaskRequest::blueprint("x"))
            .await
            .is_err()
    );
}
