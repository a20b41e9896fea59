#![allow(dead_code)]

use serde_json::{Value, json};
use storyfi::protocol::{GenerationMode, ModelInfo, OutputData, TaskResponse, TaskType};

pub fn perfect_blueprint() -> Value {
    json!({
        "title": "T",
        "genre": "G",
        "setting": "S".repeat(120),
        "core_conflict": "C".repeat(80),
        "themes": ["a", "b", "c"],
        "tone": "x",
        "target_audience": "y"
    })
}

pub fn rich_blueprint() -> Value {
    json!({
        "title": "The Drowned Lantern",
        "genre": "fantasy",
        "setting": "A flooded harbor city where lanterns hold the souls of sailors lost at sea, and the tide decides who may speak.",
        "core_conflict": "A lantern keeper must choose between freeing the trapped souls and keeping the city above water.",
        "themes": ["sacrifice", "memory", "duty"],
        "tone": "melancholic",
        "target_audience": "young adult"
    })
}

/// Twelve chapters with evenly rising progress, then `tweak` applied.
pub fn story_arc(tweak: impl FnOnce(&mut Vec<Value>)) -> Value {
    let mut chapters: Vec<Value> = (1..=12)
        .map(|id| {
            json!({
                "id": id,
                "title": format!("Chapter {id}"),
                "description": format!("Events of chapter {id} unfold."),
                "storyProgress": f64::from(id) / 12.0,
                "characterFocus": ["protagonist"]
            })
        })
        .collect();
    tweak(&mut chapters);
    json!({
        "title": "Tides",
        "description": "A keeper's long night.",
        "chapters": chapters,
        "arcs": {
            "act1": {"chapters": [1, 2, 3]},
            "act2a": {"chapters": [4, 5, 6]},
            "act2b": {"chapters": [7, 8, 9]},
            "act3": {"chapters": [10, 11, 12]}
        },
        "themes": ["duty"],
        "hooks": ["Who lit the first lantern?"]
    })
}

pub fn response(peer: &str, task_type: TaskType, output: Value, info: ModelInfo) -> TaskResponse {
    TaskResponse::new(
        peer.into(),
        task_type,
        OutputData::from_value(output),
        5.0,
        info,
    )
}

pub fn local_model() -> ModelInfo {
    ModelInfo::new(GenerationMode::Local, "qwen2.5-7b")
}
