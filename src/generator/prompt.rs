use crate::protocol::{TaskRequest, TaskType};
use serde_json::Value;

pub const GENERATOR_SYSTEM_PROMPT: &str = "You are a creative story architect for an interactive fiction platform. \
Always answer with a single JSON object and nothing else.";

fn schema_hint(task_type: TaskType) -> &'static str {
    match task_type {
        TaskType::Blueprint => {
            r#"{"title": str, "genre": str, "setting": str (100+ chars), "core_conflict": str (50+ chars), "themes": [2-5 str], "tone": str, "target_audience": str}"#
        }
        TaskType::Characters => {
            r#"{"characters": [exactly 5 objects with ids protagonist, ally, rival, mentor, wildcard; each {"id", "name", "archetype", "background", "motivation", "skills": [str], "personality_traits": [str], "relationships": {other_id: str}}]}"#
        }
        TaskType::StoryArc => {
            r#"{"title": str, "description": str, "chapters": [exactly 12 {"id": int, "title": str, "description": str, "storyProgress": 0.08..1.0 increasing, "characterFocus": [ids]}], "arcs": {"act1"|"act2a"|"act2b"|"act3": {"chapters": [3 ids]}}, "themes": [str], "hooks": [str]}"#
        }
        TaskType::Chapters => {
            r#"{"chapters": [{"id": int, "title": str, "content": 1000-3000 chars of prose, "choices": [2-4 {"text": str, "nextChapter": int, "consequences": {attribute: change, ... at least 2}}]}]}"#
        }
    }
}

fn artifact(label: &str, value: Option<&Value>) -> Option<String> {
    let value = value?;
    let pretty = serde_json::to_string_pretty(value).ok()?;
    Some(format!("{label}:\n{pretty}"))
}

/// User message for an LLM-backed generator.
pub fn build_task_prompt(request: &TaskRequest) -> String {
    let mut sections = vec![
        format!("Task: {}", request.task_type),
        format!("Story request: {}", request.user_input),
    ];
    sections.extend(artifact("Blueprint", request.blueprint.as_ref()));
    sections.extend(artifact("Characters", request.characters.as_ref()));
    sections.extend(artifact("Story arc", request.story_arc.as_ref()));
    if let Some(ids) = &request.chapter_ids {
        let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
        sections.push(format!("Write chapters: {}", ids.join(", ")));
    }
    sections.push(format!(
        "Output as a JSON object with this shape:\n{}",
        schema_hint(request.task_type)
    ));
    sections.join("\n\n")
}
