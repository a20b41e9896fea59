use serde_json::Value;

/// Built-in rubric; operators can replace it with a server-side prompt file.
pub const DEFAULT_EVALUATION_PROMPT: &str = r#"You are a professional story editor evaluating narrative quality.

Evaluate the following story content on these dimensions:
1. Narrative Flow (0-5): How smoothly does the story progress?
2. Emotional Impact (0-5): Does the story evoke emotions?
3. Creative Originality (0-5): Are the ideas fresh and interesting?
4. Internal Consistency (0-5): Is the story logically coherent?

Story Content:
{content}

Context (if provided):
{context}

Respond with ONLY a JSON object in this format:
{
    "narrative_flow": <score 0-5>,
    "emotional_impact": <score 0-5>,
    "creative_originality": <score 0-5>,
    "internal_consistency": <score 0-5>,
    "brief_notes": "<1-2 sentence summary>"
}
"#;

pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Fills `{content}` and `{context}` in a rubric template, bounding both.
pub fn render_prompt(
    template: &str,
    content: &str,
    context: &Value,
    max_content_chars: usize,
    max_context_chars: usize,
) -> String {
    let context = serde_json::to_string_pretty(context).unwrap_or_default();
    template
        .replace("{content}", truncate_chars(content, max_content_chars))
        .replace("{context}", truncate_chars(&context, max_context_chars))
}
