//! Task-specific structural rubrics, independent of prose quality.

use super::breakdown::ComponentScore;
use super::ratio;
use super::schema::{
    ACT_NAMES, CHAPTERS_PER_ACT, MAX_CHAPTER_CHARS, MIN_CHAPTER_CHARS, TARGET_ARC_CHAPTERS,
    TARGET_CAST_SIZE,
};
use crate::config::STRUCTURE_MAX;
use crate::protocol::{TaskType, canonical_json};
use serde_json::{Map, Value};
use std::collections::HashSet;

const CHARACTER_FIELDS: [&str; 7] = [
    "id",
    "name",
    "archetype",
    "background",
    "motivation",
    "skills",
    "personality_traits",
];

/// Progress violations tolerated before the monotonicity check yields nothing.
const MAX_PROGRESS_VIOLATIONS: usize = 2;

pub fn score_structure(
    data: &Map<String, Value>,
    task_type: TaskType,
    budget: f64,
) -> ComponentScore {
    let mut component = ComponentScore::new(STRUCTURE_MAX);
    match task_type {
        TaskType::Blueprint => blueprint(data, &mut component),
        TaskType::Characters => characters(data, &mut component),
        TaskType::StoryArc => story_arc(data, &mut component),
        TaskType::Chapters => chapters(data, &mut component),
    }
    component.finish(budget)
}

fn char_len(value: Option<&Value>) -> usize {
    value
        .and_then(Value::as_str)
        .map_or(0, |text| text.chars().count())
}

fn blueprint(data: &Map<String, Value>, component: &mut ComponentScore) {
    let required = TaskType::Blueprint.required_output_fields();
    let present = required.iter().filter(|f| data.contains_key(**f)).count();
    component.part("field_completeness", 20.0 * ratio(present, required.len()));

    let setting = char_len(data.get("setting"));
    let conflict = char_len(data.get("core_conflict"));
    let setting_points = match setting {
        50..=300 => 5.0,
        30..=500 => 3.0,
        _ => 0.0,
    };
    let conflict_points = match conflict {
        30..=200 => 5.0,
        15..=300 => 3.0,
        _ => 0.0,
    };
    component.part("content_length", setting_points + conflict_points);

    let themes = match data.get("themes").and_then(Value::as_array).map(Vec::len) {
        Some(2..=5) => 10.0,
        Some(1 | 6) => 5.0,
        _ => 0.0,
    };
    component.part("themes_count", themes);
}

fn characters(data: &Map<String, Value>, component: &mut ComponentScore) {
    let Some(cast) = data.get("characters").and_then(Value::as_array) else {
        component.notes.push("characters is not an array".into());
        return;
    };

    let count = cast.len();
    let count_points = if count == 0 {
        0.0
    } else if count <= TARGET_CAST_SIZE {
        20.0 * ratio(count, TARGET_CAST_SIZE)
    } else {
        20.0 * ratio(TARGET_CAST_SIZE, count)
    };
    component.part("character_count", count_points);

    if count == 0 {
        return;
    }

    let completeness: f64 = cast
        .iter()
        .map(|member| {
            member.as_object().map_or(0.0, |m| {
                let present = CHARACTER_FIELDS.iter().filter(|f| m.contains_key(**f)).count();
                ratio(present, CHARACTER_FIELDS.len())
            })
        })
        .sum();
    component.part(
        "character_completeness",
        10.0 * completeness * ratio(1, count),
    );

    let density: f64 = cast
        .iter()
        .map(|member| match relationship_count(member) {
            0 => 0.0,
            1 => 0.5,
            _ => 1.0,
        })
        .sum();
    component.part("relationships", 10.0 * density * ratio(1, count));
}

fn relationship_count(member: &Value) -> usize {
    match member.get("relationships") {
        Some(Value::Object(map)) => map.len(),
        Some(Value::Array(list)) => list.len(),
        _ => 0,
    }
}

fn story_arc(data: &Map<String, Value>, component: &mut ComponentScore) {
    let Some(chapters) = data.get("chapters").and_then(Value::as_array) else {
        component.notes.push("chapters is not an array".into());
        return;
    };

    let count = chapters.len();
    let count_points = if count == TARGET_ARC_CHAPTERS {
        20.0
    } else if count > TARGET_ARC_CHAPTERS {
        20.0 * ratio(TARGET_ARC_CHAPTERS, count)
    } else if count >= 8 {
        20.0 * ratio(count, TARGET_ARC_CHAPTERS)
    } else {
        0.0
    };
    component.part("chapter_count", count_points);

    let violations = progress_violations(chapters);
    let monotonic = if count == 0 {
        0.0
    } else if violations <= MAX_PROGRESS_VIOLATIONS {
        10.0 * (1.0 - ratio(violations, count))
    } else {
        0.0
    };
    if violations > 0 {
        component
            .notes
            .push(format!("{violations} storyProgress violation(s)"));
    }
    component.part("progress_monotonic", monotonic);

    component.part("act_structure", 10.0 * act_structure(data.get("arcs")));
}

/// Counts chapters whose `storyProgress` does not strictly exceed the last valid value.
/// A missing or non-numeric progress counts as a violation.
pub fn progress_violations(chapters: &[Value]) -> usize {
    let mut violations = 0;
    let mut previous: Option<f64> = None;
    for chapter in chapters {
        match chapter.get("storyProgress").and_then(Value::as_f64) {
            Some(progress) => {
                if previous.is_some_and(|p| progress <= p) {
                    violations += 1;
                }
                previous = Some(progress);
            }
            None => violations += 1,
        }
    }
    violations
}

/// 0–1: one quarter per act, half of that when the act is present but malformed.
fn act_structure(arcs: Option<&Value>) -> f64 {
    let Some(arcs) = arcs.and_then(Value::as_object) else {
        return 0.0;
    };
    let credit: f64 = ACT_NAMES
        .iter()
        .map(|act| match arcs.get(*act) {
            None => 0.0,
            Some(body) => {
                let well_formed = body
                    .get("chapters")
                    .and_then(Value::as_array)
                    .is_some_and(|refs| refs.len() == CHAPTERS_PER_ACT);
                if well_formed { 1.0 } else { 0.5 }
            }
        })
        .sum();
    credit * ratio(1, ACT_NAMES.len())
}

fn chapters(data: &Map<String, Value>, component: &mut ComponentScore) {
    let chapters = match data.get("chapters").and_then(Value::as_array) {
        Some(list) if !list.is_empty() => list,
        _ => {
            component.notes.push("chapters is empty or not an array".into());
            return;
        }
    };
    let per_chapter = ratio(1, chapters.len());

    let length: f64 = chapters
        .iter()
        .map(|chapter| match char_len(chapter.get("content")) {
            MIN_CHAPTER_CHARS..=MAX_CHAPTER_CHARS => 1.0,
            800..MIN_CHAPTER_CHARS => 0.7,
            3001..=3500 => 0.8,
            500..800 => 0.4,
            _ => 0.0,
        })
        .sum();
    component.part("content_length", 20.0 * length * per_chapter);

    let choices: f64 = chapters
        .iter()
        .map(|chapter| match chapter.get("choices").and_then(Value::as_array).map(Vec::len) {
            Some(2..=4) => 1.0,
            Some(1) => 0.3,
            Some(k) if k > 4 => 0.6,
            _ => 0.0,
        })
        .sum();
    component.part("choices_quality", 10.0 * choices * per_chapter);

    let diversity: f64 = chapters.iter().map(branch_diversity).sum();
    component.part("branch_diversity", 10.0 * diversity * per_chapter);
}

/// Fraction of distinct consequence signatures among a chapter's choices.
fn branch_diversity(chapter: &Value) -> f64 {
    let Some(choices) = chapter.get("choices").and_then(Value::as_array) else {
        return 0.0;
    };
    if choices.len() < 2 {
        return 0.0;
    }
    let signatures: Vec<String> = choices
        .iter()
        .filter_map(|choice| choice.get("consequences"))
        .filter(|consequences| consequences.is_object())
        .map(canonical_json)
        .collect();
    if signatures.is_empty() {
        return 0.0;
    }
    let unique: HashSet<&String> = signatures.iter().collect();
    ratio(unique.len(), signatures.len())
}
