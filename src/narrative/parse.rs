//! Recovers the judge's JSON object from free-form replies.

use serde_json::{Map, Value};

fn as_object(candidate: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(candidate.trim()) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let rest = &text[start + 3..];
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let end = rest.find("```")?;
    let candidate = rest[..end].trim();
    (!candidate.is_empty()).then_some(candidate)
}

/// First balanced `{...}` span, string-literal aware.
fn balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

fn outer_braces(text: &str) -> Option<&str> {
    let open = text.find('{')?;
    let close = text.rfind('}')?;
    (close > open).then(|| &text[open..=close])
}

/// Direct parse, then a fenced code block, then brace matching, then the
/// widest `{...}` span. Only JSON objects are accepted.
pub fn parse_judge_reply(reply: &str) -> Option<Map<String, Value>> {
    let reply = reply.trim();
    if reply.is_empty() {
        return None;
    }

    as_object(reply)
        .or_else(|| fenced_block(reply).and_then(as_object))
        .or_else(|| balanced_object(reply).and_then(as_object))
        .or_else(|| outer_braces(reply).and_then(as_object))
}
