//! Shape checks for task outputs.
//!
//! Three levels: which required keys are present, whether present keys carry
//! the expected JSON types, and a deep structural pass that reports every
//! issue it finds without affecting the score.

use crate::protocol::TaskType;
use serde_json::{Map, Value};

pub const CHARACTER_IDS: [&str; 5] = ["protagonist", "ally", "rival", "mentor", "wildcard"];
pub const TARGET_CAST_SIZE: usize = 5;
pub const TARGET_ARC_CHAPTERS: usize = 12;
pub const ACT_NAMES: [&str; 4] = ["act1", "act2a", "act2b", "act3"];
pub const CHAPTERS_PER_ACT: usize = 3;
pub const MIN_CHAPTER_CHARS: usize = 1000;
pub const MAX_CHAPTER_CHARS: usize = 3000;

/// Required keys absent from `data`.
pub fn missing_fields<'a>(data: &Map<String, Value>, required: &[&'a str]) -> Vec<&'a str> {
    required
        .iter()
        .copied()
        .filter(|field| !data.contains_key(*field))
        .collect()
}

#[derive(Clone, Copy)]
enum Kind {
    Str,
    List,
    Object,
    ListOrObject,
}

impl Kind {
    fn matches(self, value: &Value) -> bool {
        match self {
            Self::Str => value.is_string(),
            Self::List => value.is_array(),
            Self::Object => value.is_object(),
            Self::ListOrObject => value.is_array() || value.is_object(),
        }
    }
}

const BLUEPRINT_KINDS: [(&str, Kind); 7] = [
    ("title", Kind::Str),
    ("genre", Kind::Str),
    ("setting", Kind::Str),
    ("core_conflict", Kind::Str),
    ("themes", Kind::List),
    ("tone", Kind::Str),
    ("target_audience", Kind::Str),
];

const STORY_ARC_KINDS: [(&str, Kind); 6] = [
    ("title", Kind::Str),
    ("description", Kind::Str),
    ("chapters", Kind::List),
    ("arcs", Kind::Object),
    ("themes", Kind::ListOrObject),
    ("hooks", Kind::ListOrObject),
];

/// Fraction of type checks passed, including shape bonuses. May exceed 1.0;
/// callers cap the resulting score.
pub fn type_conformance(data: &Map<String, Value>, task_type: TaskType) -> f64 {
    match task_type {
        TaskType::Blueprint => {
            let (mut correct, checks) = kind_checks(data, &BLUEPRINT_KINDS);
            if let Some(themes) = data.get("themes").and_then(Value::as_array)
                && (2..=5).contains(&themes.len())
            {
                correct += 0.5;
            }
            ratio_f(correct, checks)
        }
        TaskType::Characters => match data.get("characters").and_then(Value::as_array) {
            Some(cast) => (super::ratio(cast.len(), TARGET_CAST_SIZE)).min(1.0),
            None => 0.0,
        },
        TaskType::StoryArc => {
            let (mut correct, checks) = kind_checks(data, &STORY_ARC_KINDS);
            if data
                .get("chapters")
                .and_then(Value::as_array)
                .is_some_and(|chapters| chapters.len() == TARGET_ARC_CHAPTERS)
            {
                correct += 1.0;
            }
            ratio_f(correct, checks)
        }
        TaskType::Chapters => match data.get("chapters").and_then(Value::as_array) {
            Some(chapters) if !chapters.is_empty() => {
                let well_formed = chapters.iter().all(|chapter| {
                    chapter.as_object().is_some_and(|c| {
                        ["id", "title", "content"].iter().all(|k| c.contains_key(*k))
                    })
                });
                if well_formed { 1.0 } else { 0.0 }
            }
            _ => 0.0,
        },
    }
}

fn kind_checks(data: &Map<String, Value>, kinds: &[(&str, Kind)]) -> (f64, usize) {
    let mut correct = 0.0;
    let mut checks = 0;
    for (field, kind) in kinds {
        if let Some(value) = data.get(*field) {
            checks += 1;
            if kind.matches(value) {
                correct += 1.0;
            }
        }
    }
    (correct, checks)
}

fn ratio_f(correct: f64, checks: usize) -> f64 {
    if checks == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let checks = checks as f64;
    correct / checks
}

/// Every structural problem found in `data`. Empty means well-formed.
pub fn deep_validate(data: &Map<String, Value>, task_type: TaskType) -> Vec<String> {
    let mut issues = Vec::new();
    match task_type {
        TaskType::Blueprint => {
            if let Some(themes) = data.get("themes") {
                match themes.as_array() {
                    None => issues.push("themes must be an array".into()),
                    Some(list) if list.len() < 2 => {
                        issues.push("themes must have at least 2 elements".into());
                    }
                    Some(_) => {}
                }
            }
        }
        TaskType::Characters => {
            let Some(cast) = list_field(data, "characters", &mut issues) else {
                return issues;
            };
            if cast.len() != TARGET_CAST_SIZE {
                issues.push(format!(
                    "must have exactly {TARGET_CAST_SIZE} characters, got {}",
                    cast.len()
                ));
            }
            let ids: Vec<&str> = cast
                .iter()
                .filter_map(|c| c.get("id").and_then(Value::as_str))
                .collect();
            let missing: Vec<&str> = CHARACTER_IDS
                .iter()
                .copied()
                .filter(|id| !ids.contains(id))
                .collect();
            if !missing.is_empty() {
                issues.push(format!("missing character ids: {}", missing.join(", ")));
            }
        }
        TaskType::StoryArc => {
            let Some(chapters) = list_field(data, "chapters", &mut issues) else {
                return issues;
            };
            if chapters.len() != TARGET_ARC_CHAPTERS {
                issues.push(format!(
                    "must have {TARGET_ARC_CHAPTERS} chapters, got {}",
                    chapters.len()
                ));
            }
            let last = chapters.len().saturating_sub(1);
            for (i, chapter) in chapters.iter().enumerate() {
                let n = i + 1;
                let Some(progress) = chapter.get("storyProgress") else {
                    issues.push(format!("chapter {n} missing storyProgress"));
                    continue;
                };
                let Some(progress) = progress.as_f64() else {
                    issues.push(format!("chapter {n} storyProgress must be a number"));
                    continue;
                };
                if i == 0 && !(0.05..=0.10).contains(&progress) {
                    issues.push(format!(
                        "first chapter storyProgress should be about 0.08, got {progress}"
                    ));
                }
                if i == last && i > 0 && !(0.95..=1.0).contains(&progress) {
                    issues.push(format!(
                        "last chapter storyProgress should be about 1.0, got {progress}"
                    ));
                }
            }
        }
        TaskType::Chapters => {
            let Some(chapters) = list_field(data, "chapters", &mut issues) else {
                return issues;
            };
            for (i, chapter) in chapters.iter().enumerate() {
                let n = i + 1;
                let Some(chapter) = chapter.as_object() else {
                    issues.push(format!("chapter {n} must be an object"));
                    continue;
                };
                for field in ["id", "title", "content", "choices"] {
                    if !chapter.contains_key(field) {
                        issues.push(format!("chapter {n} missing '{field}'"));
                    }
                }
                let length = chapter
                    .get("content")
                    .and_then(Value::as_str)
                    .map_or(0, |c| c.chars().count());
                if length < MIN_CHAPTER_CHARS {
                    issues.push(format!(
                        "chapter {n} content too short ({length} < {MIN_CHAPTER_CHARS} chars)"
                    ));
                }
                match chapter.get("choices") {
                    Some(Value::Array(choices)) if !(2..=4).contains(&choices.len()) => {
                        issues.push(format!(
                            "chapter {n} must have 2-4 choices, got {}",
                            choices.len()
                        ));
                    }
                    Some(Value::Array(_)) | None => {}
                    Some(_) => issues.push(format!("chapter {n} choices must be an array")),
                }
            }
        }
    }
    issues
}

fn list_field<'a>(
    data: &'a Map<String, Value>,
    field: &str,
    issues: &mut Vec<String>,
) -> Option<&'a Vec<Value>> {
    match data.get(field) {
        None => {
            issues.push(format!("missing '{field}' array"));
            None
        }
        Some(Value::Array(list)) => Some(list),
        Some(_) => {
            issues.push(format!("'{field}' must be an array"));
            None
        }
    }
}
