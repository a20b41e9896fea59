use super::compatible::{AuthStyle, OpenAiCompatibleProvider};
use super::ollama::{DEFAULT_OLLAMA_URL, OllamaProvider};
use super::traits::ChatProvider;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const ZHIPU_BASE_URL: &str = "https://open.bigmodel.cn/api/paas/v4";

/// Resolve an API key: explicit (trimmed, non-empty) first, then provider env vars.
pub fn resolve_api_key(name: &str, api_key: Option<&str>) -> Option<String> {
    if let Some(key) = api_key.map(str::trim).filter(|k| !k.is_empty()) {
        return Some(key.to_string());
    }

    let provider_env_candidates: Vec<&str> = match name {
        "openai" => vec!["OPENAI_API_KEY"],
        "zhipu" | "glm" => vec!["ZHIPU_API_KEY", "GLM_API_KEY"],
        _ => vec![],
    };

    for env_var in provider_env_candidates
        .into_iter()
        .chain(["STORYFI_API_KEY"])
    {
        if let Ok(value) = std::env::var(env_var) {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }

    None
}

/// Default base URL for a named backend, or the URL embedded in `compatible:<url>`.
pub fn provider_base_url(name: &str) -> Option<&str> {
    match name {
        "openai" => Some(OPENAI_BASE_URL),
        "zhipu" | "glm" => Some(ZHIPU_BASE_URL),
        "ollama" => Some(DEFAULT_OLLAMA_URL),
        _ => name.strip_prefix("compatible:").filter(|url| !url.is_empty()),
    }
}

/// Create a boxed [`ChatProvider`] by name.
///
/// `base_url` overrides the backend default. Unknown names are an error.
pub fn create_provider(
    name: &str,
    base_url: Option<&str>,
    api_key: Option<&str>,
    timeout_secs: u64,
) -> anyhow::Result<Box<dyn ChatProvider>> {
    let key = resolve_api_key(name, api_key);
    let key = key.as_deref();

    match name {
        "ollama" => Ok(Box::new(OllamaProvider::new(base_url, timeout_secs))),
        "openai" | "zhipu" | "glm" => {
            let url = base_url.or_else(|| provider_base_url(name)).unwrap_or(OPENAI_BASE_URL);
            if key.is_none() {
                tracing::warn!(provider = name, "no API key configured; requests will likely be rejected");
            }
            Ok(Box::new(OpenAiCompatibleProvider::with_timeout(
                name,
                url,
                key,
                AuthStyle::Bearer,
                timeout_secs,
            )))
        }
        _ if name.starts_with("compatible:") => {
            let url = base_url
                .or_else(|| provider_base_url(name))
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "Compatible provider requires a URL. Format: compatible:https://your-api.com/v1"
                    )
                })?;
            Ok(Box::new(OpenAiCompatibleProvider::with_timeout(
                "compatible",
                url,
                key,
                AuthStyle::Bearer,
                timeout_secs,
            )))
        }
        _ => anyhow::bail!("Unknown chat provider: {name}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_key_wins_and_is_trimmed() {
        assert_eq!(
            resolve_api_key("openai", Some("  abc  ")),
            Some("abc".to_string())
        );
    }

    #[test]
    fn base_urls_for_known_backends() {
        assert_eq!(provider_base_url("zhipu"), Some(ZHIPU_BASE_URL));
        assert_eq!(
            provider_base_url("compatible:http://gw.local/v1"),
            Some("http://gw.local/v1")
        );
        assert_eq!(provider_base_url("compatible:"), None);
        assert_eq!(provider_base_url("mystery"), None);
    }

    #[test]
    fn creates_known_providers() {
        assert_eq!(create_provider("ollama", None, None, 5).unwrap().name(), "ollama");
        assert_eq!(
            create_provider("zhipu", None, Some("k"), 5).unwrap().name(),
            "zhipu"
        );
        assert_eq!(
            create_provider("compatible:http://gw.local/v1", None, Some("k"), 5)
                .unwrap()
                .name(),
            "compatible"
        );
    }

    #[test]
    fn rejects_unknown_and_urlless_providers() {
        assert!(create_provider("mystery", None, None, 5).is_err());
        assert!(create_provider("compatible:", None, None, 5).is_err());
    }
}
