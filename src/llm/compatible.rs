//! Generic OpenAI-compatible chat client.
//! OpenAI, Zhipu GLM and most hosted gateways accept the same `/chat/completions` body.

use super::http_client::build_provider_client_with_timeout;
use super::scrub::api_error;
use super::traits::{ChatProvider, ChatRequestOptions};
use anyhow::Context;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

pub struct OpenAiCompatibleProvider {
    name: String,
    /// Pre-computed `(header_name, header_value)` for auth.
    cached_auth: Option<(String, String)>,
    cached_chat_url: String,
    client: Client,
}

/// How the provider expects the API key to be sent.
#[derive(Debug, Clone)]
pub enum AuthStyle {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// `x-api-key: <key>`
    XApiKey,
    /// Custom header name
    Custom(String),
}

impl OpenAiCompatibleProvider {
    pub fn new(name: &str, base_url: &str, api_key: Option<&str>, auth_style: AuthStyle) -> Self {
        Self::with_timeout(name, base_url, api_key, auth_style, 60)
    }

    pub fn with_timeout(
        name: &str,
        base_url: &str,
        api_key: Option<&str>,
        auth_style: AuthStyle,
        timeout_secs: u64,
    ) -> Self {
        let base_url = base_url.trim_end_matches('/');
        let cached_chat_url = if base_url.contains("chat/completions") {
            base_url.to_string()
        } else {
            format!("{base_url}/chat/completions")
        };

        let cached_auth = api_key.map(|k| match &auth_style {
            AuthStyle::Bearer => ("Authorization".to_string(), format!("Bearer {k}")),
            AuthStyle::XApiKey => ("x-api-key".to_string(), k.to_string()),
            AuthStyle::Custom(header) => (header.clone(), k.to_string()),
        });

        Self {
            name: name.to_string(),
            cached_auth,
            cached_chat_url,
            client: build_provider_client_with_timeout(timeout_secs),
        }
    }

    pub fn chat_completions_url(&self) -> &str {
        &self.cached_chat_url
    }

    async fn call_chat_completions(&self, request: &ChatRequest) -> anyhow::Result<ChatResponse> {
        let mut builder = self.client.post(self.chat_completions_url()).json(request);
        if let Some((header, value)) = &self.cached_auth {
            builder = builder.header(header.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .await
            .with_context(|| format!("{} request failed", self.name))?;
        if !response.status().is_success() {
            return Err(api_error(&self.name, response).await);
        }

        response
            .json::<ChatResponse>()
            .await
            .with_context(|| format!("{} returned an unreadable chat response", self.name))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

fn extract_chat_text(response: ChatResponse, provider_name: &str) -> anyhow::Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| anyhow::anyhow!("No response from {provider_name}"))
}

impl ChatProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn chat_with_system<'a>(
        &'a self,
        system_prompt: Option<&'a str>,
        message: &'a str,
        model: &'a str,
        options: ChatRequestOptions,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let mut messages = Vec::with_capacity(2);
            if let Some(system) = system_prompt {
                messages.push(Message {
                    role: "system",
                    content: system.to_string(),
                });
            }
            messages.push(Message {
                role: "user",
                content: message.to_string(),
            });

            let request = ChatRequest {
                model: model.to_string(),
                messages,
                temperature: options.temperature,
                max_tokens: options.max_tokens,
            };
            let response = self.call_chat_completions(&request).await?;
            extract_chat_text(response, &self.name)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_chat_completions_to_bare_base() {
        let p = OpenAiCompatibleProvider::new("x", "https://api.example.com/v1/", None, AuthStyle::Bearer);
        assert_eq!(
            p.chat_completions_url(),
            "https://api.example.com/v1/chat/completions"
        );
    }

    #[test]
    fn keeps_full_endpoint_urls() {
        let p = OpenAiCompatibleProvider::new(
            "zhipu",
            "https://open.bigmodel.cn/api/paas/v4/chat/completions",
            Some("k"),
            AuthStyle::Bearer,
        );
        assert_eq!(
            p.chat_completions_url(),
            "https://open.bigmodel.cn/api/paas/v4/chat/completions"
        );
    }

    #[test]
    fn auth_header_follows_style() {
        let p = OpenAiCompatibleProvider::new("x", "http://h", Some("k"), AuthStyle::XApiKey);
        assert_eq!(p.cached_auth, Some(("x-api-key".into(), "k".into())));
        let p = OpenAiCompatibleProvider::new(
            "x",
            "http://h",
            Some("k"),
            AuthStyle::Custom("api-key".into()),
        );
        assert_eq!(p.cached_auth, Some(("api-key".into(), "k".into())));
        let p = OpenAiCompatibleProvider::new("x", "http://h", None, AuthStyle::Bearer);
        assert!(p.cached_auth.is_none());
    }

    #[test]
    fn empty_choices_is_an_error() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        let err = extract_chat_text(response, "openai").unwrap_err();
        assert!(err.to_string().contains("openai"));
    }
}
