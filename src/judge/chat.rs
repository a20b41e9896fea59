use super::traits::Judge;
use crate::llm::{ChatProvider, ChatRequestOptions};
use std::future::Future;
use std::pin::Pin;

pub const JUDGE_SYSTEM_PROMPT: &str =
    "You are a professional story editor. Respond only with valid JSON.";

const JUDGE_MAX_TOKENS: u32 = 500;

/// Judge backed by any chat-completion provider.
pub struct ChatJudge {
    provider: Box<dyn ChatProvider>,
    model: String,
    temperature: f64,
}

impl ChatJudge {
    pub fn new(provider: Box<dyn ChatProvider>, model: impl Into<String>, temperature: f64) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
        }
    }
}

impl Judge for ChatJudge {
    fn name(&self) -> &str {
        self.provider.name()
    }

    fn evaluate<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        self.provider.chat_with_system(
            Some(JUDGE_SYSTEM_PROMPT),
            prompt,
            &self.model,
            ChatRequestOptions::new(self.temperature).with_max_tokens(JUDGE_MAX_TOKENS),
        )
    }
}
