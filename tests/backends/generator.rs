use std::collections::BTreeMap;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use storyfi::config::GeneratorConfig;
use storyfi::generator::{ContentGenerator, EndpointGenerator, create_generator};
use storyfi::peer::LocalPeer;
use storyfi::protocol::{GenerationMode, OutputData, TaskRequest};

#[tokio::test]
async fn endpoint_generator_feeds_a_local_peer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .and(body_partial_json(json!({"task_type": "blueprint", "user_input": "a frozen city"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": "```json\n{\"title\": \"Frostbound\", \"genre\": \"fantasy\"}\n```"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let generator = EndpointGenerator::new(format!("{}/generate", server.uri()), BTreeMap::new(), 5);
    assert_eq!(generator.mode(), GenerationMode::Custom);
    let peer = LocalPeer::new("m1", Box::new(generator), 5);

    let response = peer.respond(&TaskRequest::blueprint("a frozen city")).await;
    let output = response.output.as_ref().and_then(OutputData::as_object).unwrap();
    assert_eq!(output["title"], "Frostbound");
    assert_eq!(response.model_info.mode, Some(GenerationMode::Custom));
    server.verify().await;
}

#[tokio::test]
async fn endpoint_failure_becomes_an_error_object() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let config = GeneratorConfig {
        mode: "endpoint".into(),
        endpoint: Some(server.uri()),
        timeout_secs: 5,
        ..GeneratorConfig::default()
    };
    let peer = LocalPeer::new("m1", create_generator(&config).unwrap(), 5);
    let response = peer.respond(&TaskRequest::blueprint("x")).await;
    let output = response.output.as_ref().and_then(OutputData::as_object).unwrap();
    assert!(output.contains_key("error"));
    assert!(response.generation_time.abs() < f64::EPSILON);
}

#[cfg(unix)]
mod script {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use storyfi::error::GenerationError;
    use storyfi::generator::ScriptGenerator;
    use tempfile::TempDir;

    fn write_script(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("gen.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn script_reads_stdin_and_prints_content() {
        let tmp = TempDir::new().unwrap();
        let path = write_script(
            tmp.path(),
            r#"cat > /dev/null
echo '{"content": "{\"title\": \"From Script\"}"}'"#,
        );
        let generator = ScriptGenerator::new(&path, Vec::new(), BTreeMap::new(), 5);
        assert!(generator.health_check().await);

        let generated = generator
            .generate(&TaskRequest::blueprint("x"))
            .await
            .unwrap();
        assert_eq!(generated.generated_content, r#"{"title": "From Script"}"#);
        assert_eq!(generated.mode, GenerationMode::Custom);
    }

    #[tokio::test]
    async fn script_exit_status_is_reported() {
        let tmp = TempDir::new().unwrap();
        let path = write_script(tmp.path(), "echo 'no model loaded' >&2\nexit 3");
        let generator = ScriptGenerator::new(&path, Vec::new(), BTreeMap::new(), 5);
        let err = generator
            .generate(&TaskRequest::blueprint("x"))
            .await
            .unwrap_err();
        let GenerationError::Backend { message, .. } = &err else {
            panic!("expected a backend error, got {err:?}");
        };
        assert!(message.contains("no model loaded"));
    }

    #[tokio::test]
    async fn slow_script_times_out() {
        let tmp = TempDir::new().unwrap();
        let path = write_script(tmp.path(), "sleep 5");
        let generator = ScriptGenerator::new(&path, Vec::new(), BTreeMap::new(), 1);
        let err = generator
            .generate(&TaskRequest::blueprint("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Timeout { .. }));
    }

    #[tokio::test]
    async fn missing_script_is_not_healthy() {
        let tmp = TempDir::new().unwrap();
        let generator = ScriptGenerator::new(tmp.path().join("absent.sh"), Vec::new(), BTreeMap::new(), 1);
        assert!(!generator.health_check().await);
    }
}
