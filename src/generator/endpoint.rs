use super::traits::{ContentGenerator, GenerateFuture, GeneratedContent, content_field};
use crate::error::GenerationError;
use crate::llm::{build_provider_client_with_timeout, sanitize_api_error};
use crate::protocol::{GenerationMode, ModelInfo, TaskRequest};
use reqwest::Client;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

/// Posts the task request as JSON; the endpoint replies `{"content": ...}`.
pub struct EndpointGenerator {
    url: String,
    headers: BTreeMap<String, String>,
    client: Client,
}

impl EndpointGenerator {
    pub fn new(url: impl Into<String>, headers: BTreeMap<String, String>, timeout_secs: u64) -> Self {
        Self {
            url: url.into(),
            headers,
            client: build_provider_client_with_timeout(timeout_secs),
        }
    }

    fn backend_error(&self, message: impl Into<String>) -> GenerationError {
        GenerationError::Backend {
            generator: self.name().to_string(),
            message: message.into(),
        }
    }

    /// `/generate` endpoints expose `/health` beside them.
    fn health_url(&self) -> String {
        match self.url.strip_suffix("/generate") {
            Some(base) => format!("{base}/health"),
            None => self.url.clone(),
        }
    }
}

impl ContentGenerator for EndpointGenerator {
    fn name(&self) -> &str {
        "endpoint"
    }

    fn mode(&self) -> GenerationMode {
        GenerationMode::Custom
    }

    fn model_info(&self) -> ModelInfo {
        let mut info = ModelInfo::new(GenerationMode::Custom, "custom");
        info.provider = Some("custom".into());
        info.parameters
            .insert("endpoint".into(), Value::from(self.url.clone()));
        info
    }

    fn generate<'a>(&'a self, request: &'a TaskRequest) -> GenerateFuture<'a> {
        Box::pin(async move {
            let started = Instant::now();
            let mut builder = self.client.post(&self.url).json(request);
            for (name, value) in &self.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            let response = builder
                .send()
                .await
                .map_err(|e| self.backend_error(format!("request failed: {e}")))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(self.backend_error(format!(
                    "HTTP {status}: {}",
                    sanitize_api_error(&body)
                )));
            }
            let reply: Value = response.json().await.map_err(|e| {
                GenerationError::InvalidOutput {
                    generator: self.name().to_string(),
                    message: format!("reply is not JSON: {e}"),
                }
            })?;

            let mut metadata = Map::new();
            metadata.insert("endpoint".into(), Value::from(self.url.clone()));
            Ok(GeneratedContent {
                generated_content: content_field(self.name(), &reply)?,
                model: "custom".into(),
                mode: GenerationMode::Custom,
                generation_time: started.elapsed().as_secs_f64(),
                metadata,
            })
        })
    }

    fn health_check<'a>(&'a self) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        Box::pin(async move {
            self.client
                .get(self.health_url())
                .timeout(Duration::from_secs(5))
                .send()
                .await
                .is_ok_and(|r| r.status().is_success())
        })
    }
}
