use super::chat::ChatJudge;
use super::custom::CustomJudge;
use super::reliable::ReliableJudge;
use super::traits::Judge;
use crate::config::NarrativeConfig;
use crate::llm::create_provider;

pub fn default_judge_model(backend: &str) -> &'static str {
    match backend {
        "openai" => "gpt-4o-mini",
        "zhipu" | "glm" => "glm-4-flash",
        _ => "qwen2.5:7b",
    }
}

/// Builds the configured judge wrapped in retry/timeout handling.
///
/// Returns `Ok(None)` when judging is disabled or the backend is `none`.
pub fn create_judge(config: &NarrativeConfig) -> anyhow::Result<Option<Box<dyn Judge>>> {
    let backend = config.backend.trim();
    if !config.enabled || backend.is_empty() || backend == "none" {
        return Ok(None);
    }

    let inner: Box<dyn Judge> = if backend == "custom" {
        let url = config
            .base_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("custom judge requires narrative.base_url"))?;
        Box::new(CustomJudge::new(
            url,
            config.custom_headers.clone(),
            config.timeout_secs,
        ))
    } else {
        let provider = create_provider(
            backend,
            config.base_url.as_deref(),
            config.api_key.as_deref(),
            config.timeout_secs,
        )?;
        let model = config
            .model
            .clone()
            .unwrap_or_else(|| default_judge_model(backend).to_string());
        Box::new(ChatJudge::new(provider, model, config.temperature))
    };

    Ok(Some(Box::new(ReliableJudge::new(
        inner,
        config.max_retries,
        config.backoff_ms,
        config.timeout_secs,
    ))))
}
