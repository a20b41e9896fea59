use super::breakdown::ComponentScore;
use super::similarity::{bigram_jaccard, content_hash};
use crate::config::{CONTENT_MAX, ContentConfig};
use crate::protocol::{TaskRequest, TaskType, canonical_json};
use crate::reputation::HistoryStore;
use serde_json::{Map, Value};
use std::collections::HashSet;

const RELEVANCE_MAX: f64 = 15.0;
const FLUENCY_MAX: f64 = 10.0;
const ORIGINALITY_MAX: f64 = 5.0;

/// Keyword relevance, fluency heuristics and originality against history.
/// No external model is involved.
pub struct ContentScorer {
    config: ContentConfig,
}

impl ContentScorer {
    pub fn new(config: ContentConfig) -> Self {
        Self { config }
    }

    pub fn score(
        &self,
        data: &Map<String, Value>,
        request: &TaskRequest,
        history: &HistoryStore,
        budget: f64,
    ) -> ComponentScore {
        let mut component = ComponentScore::new(CONTENT_MAX);
        if self.config.use_embeddings {
            // No embedding backend yet; keyword overlap stands in.
            component
                .notes
                .push("embedding relevance unavailable; used keyword overlap".into());
        }
        component.part("relevance", relevance(data, request));
        component.part("fluency", fluency(data, request.task_type));
        component.part("originality", self.originality(data, history));
        component.finish(budget)
    }

    /// 0–5: zero on an exact duplicate, else graded by the closest recent entry.
    fn originality(&self, data: &Map<String, Value>, history: &HistoryStore) -> f64 {
        if history.is_empty() {
            return ORIGINALITY_MAX;
        }
        let canonical = canonical_json(&Value::Object(data.clone()));
        let hash = content_hash(&canonical);
        if history
            .recent(self.config.duplicate_window)
            .any(|entry| entry.hash == hash)
        {
            return 0.0;
        }

        let closest = history
            .recent(self.config.similarity_window)
            .map(|entry| bigram_jaccard(&canonical, &entry.canonical))
            .fold(0.0_f64, f64::max);
        if closest < 0.8 {
            ORIGINALITY_MAX
        } else if closest < 0.9 {
            2.0
        } else {
            0.0
        }
    }
}

/// Lowercased alphanumeric words drawn from every string inside `value`.
fn keywords(value: &Value, out: &mut HashSet<String>) {
    match value {
        Value::String(text) => out.extend(words(text)),
        Value::Array(items) => items.iter().for_each(|item| keywords(item, out)),
        Value::Object(map) => map.values().for_each(|item| keywords(item, out)),
        _ => {}
    }
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
}

/// 0–15: overlap between the request (or upstream blueprint) and the new artifact.
fn relevance(data: &Map<String, Value>, request: &TaskRequest) -> f64 {
    let (source, target, per_match) = match request.task_type {
        TaskType::Blueprint => {
            let source: HashSet<String> = words(&request.user_input).collect();
            let mut target = HashSet::new();
            for field in ["title", "genre", "setting"] {
                if let Some(value) = data.get(field) {
                    keywords(value, &mut target);
                }
            }
            (source, target, 3.0)
        }
        task_type => {
            let mut source = HashSet::new();
            if let Some(blueprint) = &request.blueprint {
                keywords(blueprint, &mut source);
            }
            let mut target = HashSet::new();
            data.values().for_each(|value| keywords(value, &mut target));
            let per_match = if task_type == TaskType::Characters { 0.5 } else { 0.3 };
            (source, target, per_match)
        }
    };
    let overlap = source.intersection(&target).count();
    (super::ratio(overlap, 1) * per_match).min(RELEVANCE_MAX)
}

fn prose(data: &Map<String, Value>, task_type: TaskType) -> String {
    let field_text = |list_key: &str, field: &str| -> String {
        data.get(list_key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.get(field).and_then(Value::as_str))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default()
    };
    match task_type {
        TaskType::Blueprint => ["setting", "core_conflict"]
            .iter()
            .filter_map(|key| data.get(*key).and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join(" "),
        TaskType::Characters => field_text("characters", "background"),
        TaskType::StoryArc => field_text("chapters", "description"),
        TaskType::Chapters => field_text("chapters", "content"),
    }
}

const SENTENCE_ENDS: [char; 6] = ['.', '!', '?', '。', '！', '？'];

/// 0–10: punctuation, lexical variety, length for the task, sentence length.
fn fluency(data: &Map<String, Value>, task_type: TaskType) -> f64 {
    let text = prose(data, task_type);
    if text.trim().is_empty() {
        return 0.0;
    }
    let mut score = 0.0;

    if text.contains(SENTENCE_ENDS) {
        score += 2.0;
    }

    let tokens: Vec<&str> = text.split_whitespace().collect();
    let unique: HashSet<&str> = tokens.iter().copied().collect();
    let variety = super::ratio(unique.len(), tokens.len());
    if variety > 0.6 {
        score += 3.0;
    } else if variety > 0.4 {
        score += 1.5;
    }

    let (long, medium) = if task_type == TaskType::Chapters {
        (500, 300)
    } else {
        (100, 50)
    };
    if tokens.len() > long {
        score += 3.0;
    } else if tokens.len() > medium {
        score += 1.5;
    }

    let sentences: Vec<usize> = text
        .split(SENTENCE_ENDS)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.split_whitespace().count())
        .collect();
    if sentences.len() > 3 {
        let average = super::ratio(sentences.iter().sum(), sentences.len());
        if average > 10.0 && average < 30.0 {
            score += 2.0;
        }
    }

    f64::min(score, FLUENCY_MAX)
}
