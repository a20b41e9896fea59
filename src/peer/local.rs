use crate::error::GenerationError;
use crate::generator::{ContentGenerator, generate_with_timeout};
use crate::protocol::{OutputData, PeerId, TaskRequest, TaskResponse, TaskType};
use serde_json::{Map, Value, json};
use std::time::Instant;

/// Miner side of a peer: runs a generator and shapes its text into a task response.
pub struct LocalPeer {
    id: PeerId,
    generator: Box<dyn ContentGenerator>,
    timeout_secs: u64,
}

impl LocalPeer {
    pub fn new(id: impl Into<PeerId>, generator: Box<dyn ContentGenerator>, timeout_secs: u64) -> Self {
        Self {
            id: id.into(),
            generator,
            timeout_secs,
        }
    }

    pub fn id(&self) -> &PeerId {
        &self.id
    }

    pub fn generator(&self) -> &dyn ContentGenerator {
        self.generator.as_ref()
    }

    /// Always produces a response. A generator that misses its deadline yields
    /// an absent response. Other failures become an `error` object with zero
    /// generation time, and model info is declared either way.
    pub async fn respond(&self, request: &TaskRequest) -> TaskResponse {
        let started = Instant::now();
        let model_info = self.generator.model_info();

        if let Err(e) = request.validate() {
            tracing::warn!(peer = %self.id, error = %e, "rejecting invalid task");
            return TaskResponse::new(
                self.id.clone(),
                request.task_type,
                OutputData::Structured(error_object(e.to_string())),
                0.0,
                model_info,
            );
        }

        match generate_with_timeout(self.generator.as_ref(), request, self.timeout_secs).await {
            Ok(generated) => {
                let output = normalize_generated(&generated.generated_content, request.task_type);
                let generation_time = if generated.generation_time > 0.0 {
                    generated.generation_time
                } else {
                    started.elapsed().as_secs_f64()
                };
                tracing::debug!(
                    peer = %self.id,
                    task_type = %request.task_type,
                    generation_time,
                    "task generated"
                );
                TaskResponse::new(
                    self.id.clone(),
                    request.task_type,
                    OutputData::Structured(output),
                    generation_time,
                    model_info,
                )
            }
            Err(e @ GenerationError::Timeout { .. }) => {
                tracing::warn!(peer = %self.id, error = %e, "generation timed out");
                TaskResponse::absent(self.id.clone(), request.task_type)
            }
            Err(e) => {
                tracing::warn!(peer = %self.id, error = %e, "generation failed");
                TaskResponse::new(
                    self.id.clone(),
                    request.task_type,
                    OutputData::Structured(error_object(e.to_string())),
                    0.0,
                    model_info,
                )
            }
        }
    }
}

fn error_object(message: String) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("error".into(), Value::String(message));
    map
}

fn strip_fence(text: &str) -> &str {
    let text = text.trim();
    let body = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Turns raw generator text into the object a peer sends back.
///
/// A JSON object passes through. A top-level array is a format mismatch and is
/// reported with the raw list attached. Anything else is wrapped as
/// `generated_text`.
pub fn normalize_generated(content: &str, task_type: TaskType) -> Map<String, Value> {
    let body = strip_fence(content);
    if body.is_empty() {
        return error_object("Empty response from generator".into());
    }

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => map,
        Ok(list @ Value::Array(_)) => {
            let value = json!({
                "error": format!("Format mismatch: {task_type} must return JSON object, not array"),
                "hint": "Check your prompt templates - all tasks require object format {...}",
                "raw_output": list,
            });
            match value {
                Value::Object(map) => map,
                _ => Map::new(),
            }
        }
        _ => {
            let mut map = Map::new();
            map.insert("generated_text".into(), Value::String(content.to_string()));
            map
        }
    }
}
