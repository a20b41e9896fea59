use super::api::ApiGenerator;
use super::endpoint::EndpointGenerator;
use super::mock::MockGenerator;
use super::script::ScriptGenerator;
use super::traits::ContentGenerator;
use crate::config::GeneratorConfig;
use crate::error::GenerationError;
use crate::llm::{ChatRequestOptions, create_provider};

fn default_model(provider: &str) -> &'static str {
    match provider {
        "zhipu" | "glm" => "glm-4-flash",
        "ollama" => "qwen2.5:7b",
        _ => "gpt-4o-mini",
    }
}

/// Builds the generator selected by `generator.mode`.
pub fn create_generator(config: &GeneratorConfig) -> Result<Box<dyn ContentGenerator>, GenerationError> {
    match config.mode.trim() {
        "mock" => Ok(Box::new(MockGenerator::new())),
        "endpoint" => {
            let url = config
                .endpoint
                .as_deref()
                .filter(|u| !u.trim().is_empty())
                .ok_or_else(|| GenerationError::Config("endpoint mode requires generator.endpoint".into()))?;
            Ok(Box::new(EndpointGenerator::new(
                url,
                config.endpoint_headers.clone(),
                config.timeout_secs,
            )))
        }
        "script" => {
            let path = config.script_path.clone().ok_or_else(|| {
                GenerationError::Config("script mode requires generator.script_path".into())
            })?;
            Ok(Box::new(ScriptGenerator::new(
                path,
                config.script_args.clone(),
                config.script_env.clone(),
                config.timeout_secs,
            )))
        }
        "api" => {
            let provider_name = config.provider.as_deref().unwrap_or("openai");
            let provider = create_provider(
                provider_name,
                config.base_url.as_deref(),
                config.api_key.as_deref(),
                config.timeout_secs,
            )
            .map_err(|e| GenerationError::Config(e.to_string()))?;
            let model = config
                .model
                .clone()
                .unwrap_or_else(|| default_model(provider_name).to_string());
            Ok(Box::new(ApiGenerator::new(
                provider_name,
                provider,
                model,
                ChatRequestOptions::new(config.temperature).with_max_tokens(config.max_tokens),
            )))
        }
        other => Err(GenerationError::Config(format!(
            "unknown generator mode '{other}' (expected mock, endpoint, script or api)"
        ))),
    }
}
