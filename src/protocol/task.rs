use crate::error::TaskError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// The four story-generation stages a validator can issue.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskType {
    Blueprint,
    Characters,
    StoryArc,
    Chapters,
}

const BLUEPRINT_FIELDS: [&str; 7] = [
    "title",
    "genre",
    "setting",
    "core_conflict",
    "themes",
    "tone",
    "target_audience",
];
const CHARACTERS_FIELDS: [&str; 1] = ["characters"];
const STORY_ARC_FIELDS: [&str; 6] = [
    "title",
    "description",
    "chapters",
    "arcs",
    "themes",
    "hooks",
];
const CHAPTERS_FIELDS: [&str; 1] = ["chapters"];

impl TaskType {
    /// Keys that must exist at the top level of the output object.
    pub fn required_output_fields(self) -> &'static [&'static str] {
        match self {
            Self::Blueprint => &BLUEPRINT_FIELDS,
            Self::Characters => &CHARACTERS_FIELDS,
            Self::StoryArc => &STORY_ARC_FIELDS,
            Self::Chapters => &CHAPTERS_FIELDS,
        }
    }

    pub fn parse(raw: &str) -> Result<Self, TaskError> {
        raw.trim()
            .parse()
            .map_err(|_| TaskError::UnknownTaskType(raw.to_string()))
    }
}

/// A task issued to peers. Later stages carry the artifacts produced by earlier ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRequest {
    pub task_type: TaskType,
    pub user_input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blueprint: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characters: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_arc: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_ids: Option<Vec<u32>>,
}

impl TaskRequest {
    pub fn blueprint(user_input: impl Into<String>) -> Self {
        Self {
            task_type: TaskType::Blueprint,
            user_input: user_input.into(),
            blueprint: None,
            characters: None,
            story_arc: None,
            chapter_ids: None,
        }
    }

    pub fn characters(user_input: impl Into<String>, blueprint: Value) -> Self {
        Self {
            task_type: TaskType::Characters,
            blueprint: Some(blueprint),
            ..Self::blueprint(user_input)
        }
    }

    pub fn story_arc(user_input: impl Into<String>, blueprint: Value, characters: Value) -> Self {
        Self {
            task_type: TaskType::StoryArc,
            blueprint: Some(blueprint),
            characters: Some(characters),
            ..Self::blueprint(user_input)
        }
    }

    pub fn chapters(
        user_input: impl Into<String>,
        blueprint: Value,
        characters: Value,
        story_arc: Value,
        chapter_ids: Vec<u32>,
    ) -> Self {
        Self {
            task_type: TaskType::Chapters,
            blueprint: Some(blueprint),
            characters: Some(characters),
            story_arc: Some(story_arc),
            chapter_ids: Some(chapter_ids),
            ..Self::blueprint(user_input)
        }
    }

    /// Checks that every upstream artifact the task type depends on is present.
    pub fn validate(&self) -> Result<(), TaskError> {
        let task = self.task_type_name();
        let needs_blueprint = self.task_type != TaskType::Blueprint;
        let needs_characters = matches!(self.task_type, TaskType::StoryArc | TaskType::Chapters);
        let needs_arc = self.task_type == TaskType::Chapters;

        if needs_blueprint && is_missing(self.blueprint.as_ref()) {
            return Err(TaskError::MissingArtifact {
                task,
                artifact: "blueprint",
            });
        }
        if needs_characters && is_missing(self.characters.as_ref()) {
            return Err(TaskError::MissingArtifact {
                task,
                artifact: "characters",
            });
        }
        if needs_arc {
            if is_missing(self.story_arc.as_ref()) {
                return Err(TaskError::MissingArtifact {
                    task,
                    artifact: "story_arc",
                });
            }
            match &self.chapter_ids {
                None => {
                    return Err(TaskError::MissingArtifact {
                        task,
                        artifact: "chapter_ids",
                    });
                }
                Some(ids) if ids.is_empty() => return Err(TaskError::EmptyChapterIds),
                Some(_) => {}
            }
        }
        Ok(())
    }

    fn task_type_name(&self) -> &'static str {
        match self.task_type {
            TaskType::Blueprint => "blueprint",
            TaskType::Characters => "characters",
            TaskType::StoryArc => "story_arc",
            TaskType::Chapters => "chapters",
        }
    }
}

fn is_missing(value: Option<&Value>) -> bool {
    value.is_none_or(Value::is_null)
}
