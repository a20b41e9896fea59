use crate::protocol::TaskType;
use serde_json::{Map, Value};

const MAX_CHARACTERS: usize = 5;
const MAX_ARC_CHAPTERS: usize = 12;
const MAX_PROSE_CHAPTERS: usize = 3;

fn text<'a>(map: &'a Map<String, Value>, key: &str) -> &'a str {
    map.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn label(map: &Map<String, Value>, key: &str, default: &str) -> String {
    match map.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => default.to_string(),
    }
}

fn objects<'a>(data: &'a Map<String, Value>, key: &str, limit: usize) -> Vec<&'a Map<String, Value>> {
    data.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .take(limit)
                .filter_map(Value::as_object)
                .collect()
        })
        .unwrap_or_default()
}

/// Pulls the prose a judge should read from an output, bounded per task type.
pub fn extract_content(data: &Map<String, Value>, task_type: TaskType) -> String {
    let parts: Vec<String> = match task_type {
        TaskType::Blueprint => {
            let themes = data
                .get("themes")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .unwrap_or_default();
            vec![
                format!("Title: {}", text(data, "title")),
                format!("Genre: {}", text(data, "genre")),
                format!("Setting: {}", text(data, "setting")),
                format!("Core Conflict: {}", text(data, "core_conflict")),
                format!("Themes: {themes}"),
            ]
        }
        TaskType::Characters => objects(data, "characters", MAX_CHARACTERS)
            .into_iter()
            .map(|c| {
                format!(
                    "Character: {}\nBackground: {}\nMotivation: {}",
                    label(c, "name", "Unknown"),
                    text(c, "background"),
                    text(c, "motivation")
                )
            })
            .collect(),
        TaskType::StoryArc => objects(data, "chapters", MAX_ARC_CHAPTERS)
            .into_iter()
            .map(|c| {
                let number = c
                    .get("id")
                    .or_else(|| c.get("chapter"))
                    .map_or_else(|| "?".to_string(), |v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    });
                format!(
                    "Chapter {number}: {}\n{}",
                    text(c, "title"),
                    text(c, "description")
                )
            })
            .collect(),
        TaskType::Chapters => objects(data, "chapters", MAX_PROSE_CHAPTERS)
            .into_iter()
            .map(|c| text(c, "content").to_string())
            .collect(),
    };
    parts.join("\n\n")
}
