use crate::error::GenerationError;
use crate::protocol::{GenerationMode, ModelInfo, TaskRequest};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Raw generator output, before it is normalized into a task response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub generated_content: String,
    pub model: String,
    pub mode: GenerationMode,
    /// Seconds spent generating.
    pub generation_time: f64,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

pub type GenerateFuture<'a> =
    Pin<Box<dyn Future<Output = Result<GeneratedContent, GenerationError>> + Send + 'a>>;

pub trait ContentGenerator: Send + Sync {
    /// Backend identifier used in logs and errors.
    fn name(&self) -> &str;

    fn mode(&self) -> GenerationMode;

    /// What a peer declares about its model.
    fn model_info(&self) -> ModelInfo;

    fn generate<'a>(&'a self, request: &'a TaskRequest) -> GenerateFuture<'a>;

    /// Readiness probe; never errors.
    fn health_check<'a>(&'a self) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        Box::pin(async { true })
    }
}

/// Runs one generation under a deadline.
pub async fn generate_with_timeout(
    generator: &dyn ContentGenerator,
    request: &TaskRequest,
    timeout_secs: u64,
) -> Result<GeneratedContent, GenerationError> {
    tokio::time::timeout(
        Duration::from_secs(timeout_secs.max(1)),
        generator.generate(request),
    )
    .await
    .map_err(|_| GenerationError::Timeout {
        generator: generator.name().to_string(),
        timeout_secs,
    })?
}

/// Extracts the `content` field every external backend must reply with.
pub(crate) fn content_field(generator: &str, reply: &Value) -> Result<String, GenerationError> {
    match reply.get("content") {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(Value::Null) | None => Err(GenerationError::InvalidOutput {
            generator: generator.to_string(),
            message: "reply is missing the 'content' field".into(),
        }),
        Some(other) => Ok(other.to_string()),
    }
}
