use super::traits::Judge;
use crate::llm::{api_error, build_provider_client_with_timeout};
use anyhow::Context;
use reqwest::Client;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

/// Judge for an operator-run endpoint.
///
/// Posts `{"prompt": ...}`; the reply is the `response` field of a JSON body,
/// or the raw body when it is not JSON.
pub struct CustomJudge {
    url: String,
    headers: BTreeMap<String, String>,
    client: Client,
}

impl CustomJudge {
    pub fn new(url: impl Into<String>, headers: BTreeMap<String, String>, timeout_secs: u64) -> Self {
        Self {
            url: url.into(),
            headers,
            client: build_provider_client_with_timeout(timeout_secs),
        }
    }
}

fn reply_text(body: String) -> String {
    match serde_json::from_str::<Value>(&body) {
        Ok(Value::Object(map)) => match map.get("response") {
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
            None => body,
        },
        _ => body,
    }
}

impl Judge for CustomJudge {
    fn name(&self) -> &str {
        "custom"
    }

    fn evaluate<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let mut builder = self.client.post(&self.url).json(&json!({ "prompt": prompt }));
            for (name, value) in &self.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            let response = builder
                .send()
                .await
                .context("custom judge request failed")?;
            if !response.status().is_success() {
                return Err(api_error("custom judge", response).await);
            }
            let body = response
                .text()
                .await
                .context("custom judge returned an unreadable body")?;
            Ok(reply_text(body))
        })
    }
}
