use super::prompt::{GENERATOR_SYSTEM_PROMPT, build_task_prompt};
use super::traits::{ContentGenerator, GenerateFuture, GeneratedContent};
use crate::error::GenerationError;
use crate::llm::{ChatProvider, ChatRequestOptions};
use crate::protocol::{GenerationMode, ModelInfo, TaskRequest};
use serde_json::{Map, Value};
use std::time::Instant;

/// Generates through a chat-completion provider.
///
/// A local Ollama server declares `local`; hosted providers declare `api`.
pub struct ApiGenerator {
    provider_name: String,
    provider: Box<dyn ChatProvider>,
    model: String,
    options: ChatRequestOptions,
}

impl ApiGenerator {
    pub fn new(
        provider_name: impl Into<String>,
        provider: Box<dyn ChatProvider>,
        model: impl Into<String>,
        options: ChatRequestOptions,
    ) -> Self {
        Self {
            provider_name: provider_name.into(),
            provider,
            model: model.into(),
            options,
        }
    }
}

impl ContentGenerator for ApiGenerator {
    fn name(&self) -> &str {
        "api"
    }

    fn mode(&self) -> GenerationMode {
        if self.provider_name == "ollama" {
            GenerationMode::Local
        } else {
            GenerationMode::Api
        }
    }

    fn model_info(&self) -> ModelInfo {
        let mut info = ModelInfo::new(self.mode(), self.model.clone());
        info.provider = Some(self.provider_name.clone());
        info.parameters
            .insert("temperature".into(), Value::from(self.options.temperature));
        if let Some(max_tokens) = self.options.max_tokens {
            info.parameters
                .insert("max_tokens".into(), Value::from(max_tokens));
        }
        info
    }

    fn generate<'a>(&'a self, request: &'a TaskRequest) -> GenerateFuture<'a> {
        Box::pin(async move {
            let started = Instant::now();
            let prompt = build_task_prompt(request);
            let text = self
                .provider
                .chat_with_system(Some(GENERATOR_SYSTEM_PROMPT), &prompt, &self.model, self.options)
                .await
                .map_err(|e| GenerationError::Backend {
                    generator: format!("{}/{}", self.provider_name, self.model),
                    message: e.to_string(),
                })?;

            let mut metadata = Map::new();
            metadata.insert("provider".into(), Value::from(self.provider_name.clone()));
            Ok(GeneratedContent {
                generated_content: text,
                model: self.model.clone(),
                mode: self.mode(),
                generation_time: started.elapsed().as_secs_f64(),
                metadata,
            })
        })
    }
}
