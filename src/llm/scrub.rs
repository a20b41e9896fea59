use std::borrow::Cow;

const MAX_API_ERROR_CHARS: usize = 200;
const REDACTED: &str = "[REDACTED]";

/// Key prefixes that identify a credential on their own.
const KEY_PREFIXES: [&str; 6] = ["sk-", "ghp_", "hf_", "AIza", "eyJ", "glpat-"];

/// Markers followed by a credential value.
const VALUE_MARKERS: [&str; 8] = [
    "Authorization: Bearer ",
    "authorization: bearer ",
    "Bearer ",
    "api_key=",
    "access_token=",
    "\"api_key\":\"",
    "\"access_token\":\"",
    "\"token\":\"",
];

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '+' | '/' | '=')
}

fn redact_after(text: &mut String, marker: &str, keep_marker: bool) {
    let mut from = 0;
    while let Some(rel) = text[from..].find(marker) {
        let start = from + rel;
        let value_start = start + marker.len();
        let value_len: usize = text[value_start..]
            .chars()
            .take_while(|c| is_token_char(*c))
            .map(char::len_utf8)
            .sum();
        if value_len == 0 {
            from = value_start;
            continue;
        }
        let replace_from = if keep_marker { value_start } else { start };
        text.replace_range(replace_from..value_start + value_len, REDACTED);
        from = replace_from + REDACTED.len();
    }
}

/// Redacts API keys and bearer tokens echoed back in provider error bodies.
pub fn scrub_secret_patterns(input: &str) -> Cow<'_, str> {
    let hit = KEY_PREFIXES
        .iter()
        .chain(VALUE_MARKERS.iter())
        .any(|p| input.contains(p));
    if !hit {
        return Cow::Borrowed(input);
    }

    let mut scrubbed = input.to_string();
    for marker in VALUE_MARKERS {
        redact_after(&mut scrubbed, marker, true);
    }
    for prefix in KEY_PREFIXES {
        redact_after(&mut scrubbed, prefix, false);
    }
    Cow::Owned(scrubbed)
}

/// Scrubs secrets and truncates to a loggable length.
pub fn sanitize_api_error(input: &str) -> String {
    let scrubbed = scrub_secret_patterns(input);
    if scrubbed.chars().count() <= MAX_API_ERROR_CHARS {
        return scrubbed.into_owned();
    }
    let truncated: String = scrubbed.chars().take(MAX_API_ERROR_CHARS).collect();
    format!("{truncated}...")
}

/// Build a sanitized provider error from a failed HTTP response.
pub async fn api_error(provider: &str, response: reqwest::Response) -> anyhow::Error {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read provider error body>".to_string());
    anyhow::anyhow!("{provider} API error ({status}): {}", sanitize_api_error(&body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_bearer_tokens_but_keeps_marker() {
        let scrubbed = scrub_secret_patterns("Authorization: Bearer abc123.def rejected");
        assert_eq!(scrubbed, "Authorization: Bearer [REDACTED] rejected");
    }

    #[test]
    fn redacts_prefixed_keys() {
        let scrubbed = scrub_secret_patterns("invalid key sk-live-0123456789 supplied");
        assert!(!scrubbed.contains("sk-live"));
        assert!(scrubbed.contains(REDACTED));
    }

    #[test]
    fn clean_text_is_borrowed() {
        assert!(matches!(
            scrub_secret_patterns("model not found"),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn long_errors_are_truncated_on_char_boundary() {
        let body = "错".repeat(300);
        let sanitized = sanitize_api_error(&body);
        assert!(sanitized.ends_with("..."));
        assert_eq!(sanitized.chars().count(), MAX_API_ERROR_CHARS + 3);
    }
}
