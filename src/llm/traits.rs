use std::future::Future;
use std::pin::Pin;

/// Sampling knobs for one completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChatRequestOptions {
    pub temperature: f64,
    pub max_tokens: Option<u32>,
}

impl Default for ChatRequestOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: None,
        }
    }
}

impl ChatRequestOptions {
    pub fn new(temperature: f64) -> Self {
        Self {
            temperature,
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

pub trait ChatProvider: Send + Sync {
    /// Provider identifier (e.g. "openai", "ollama").
    fn name(&self) -> &str;

    /// One system + user exchange; returns the assistant text.
    fn chat_with_system<'a>(
        &'a self,
        system_prompt: Option<&'a str>,
        message: &'a str,
        model: &'a str,
        options: ChatRequestOptions,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>>;

    fn chat<'a>(
        &'a self,
        message: &'a str,
        model: &'a str,
        options: ChatRequestOptions,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        self.chat_with_system(None, message, model, options)
    }
}
