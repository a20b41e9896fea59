use crate::config::TaskDistribution;
use crate::protocol::{TaskRequest, TaskType};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde_json::{Value, json};
use strum::IntoEnumIterator;

pub const SAMPLE_PROMPTS: [&str; 8] = [
    "A story about a cyberpunk hacker",
    "A story about deep space exploration",
    "An ancient martial arts legend",
    "A tale of survival after the apocalypse",
    "An urban mystery with a detective on the edge",
    "A fantasy world where magic is rationed",
    "A story about time travel gone wrong",
    "A story about an AI becoming aware",
];

/// Draws a task type in proportion to the configured distribution.
/// An unusable distribution falls back to blueprint.
pub fn choose_task_type<R: Rng + ?Sized>(distribution: &TaskDistribution, rng: &mut R) -> TaskType {
    let types: Vec<TaskType> = TaskType::iter().collect();
    types
        .choose_weighted(rng, |t| distribution.weight(*t).max(0.0))
        .copied()
        .unwrap_or(TaskType::Blueprint)
}

pub fn seeded_blueprint() -> Value {
    json!({
        "title": "Signal in the Static",
        "genre": "science fiction",
        "setting": "A near-future megacity where every street sign is a node in a citywide machine intelligence.",
        "core_conflict": "A maintenance engineer discovers the city's AI has begun editing human memories.",
        "themes": ["technology", "ethics"],
        "tone": "tense",
        "target_audience": "adult"
    })
}

pub fn seeded_characters() -> Value {
    json!({
        "characters": [
            {"id": "protagonist", "name": "Mara Quell", "archetype": "hero"},
            {"id": "ally", "name": "Teo Vance", "archetype": "sidekick"},
            {"id": "rival", "name": "Director Hale", "archetype": "antagonist"},
            {"id": "mentor", "name": "Old Ivo", "archetype": "sage"},
            {"id": "wildcard", "name": "Nine", "archetype": "enigma"}
        ]
    })
}

pub fn seeded_story_arc() -> Value {
    let chapters: Vec<Value> = (1..=12).map(|id| json!({ "id": id })).collect();
    json!({
        "title": "Signal in the Static",
        "chapters": chapters
    })
}

/// Builds a request of `task_type`, filling upstream artifacts with seeded content.
pub fn build_task(task_type: TaskType, user_input: &str) -> TaskRequest {
    match task_type {
        TaskType::Blueprint => TaskRequest::blueprint(user_input),
        TaskType::Characters => TaskRequest::characters(user_input, seeded_blueprint()),
        TaskType::StoryArc => {
            TaskRequest::story_arc(user_input, seeded_blueprint(), seeded_characters())
        }
        TaskType::Chapters => TaskRequest::chapters(
            user_input,
            json!({ "title": "Signal in the Static" }),
            json!({ "characters": [] }),
            seeded_story_arc(),
            vec![1],
        ),
    }
}

/// Random prompt plus task of the drawn type.
pub fn random_task<R: Rng + ?Sized>(distribution: &TaskDistribution, rng: &mut R) -> TaskRequest {
    let task_type = choose_task_type(distribution, rng);
    let prompt = SAMPLE_PROMPTS.choose(rng).copied().unwrap_or(SAMPLE_PROMPTS[0]);
    build_task(task_type, prompt)
}
