//! Offline generator producing schema-shaped stories from word pools.
//!
//! Content is randomized per call so independent mock peers do not look like
//! copies of each other. `quality` below 1.0 makes some outputs drop a field.

use super::traits::{ContentGenerator, GenerateFuture, GeneratedContent};
use crate::protocol::{GenerationMode, ModelInfo, TaskRequest, TaskType};
use crate::scoring::schema::CHARACTER_IDS;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};
use serde_json::{Map, Value, json};
use std::sync::{Mutex, PoisonError};

const TITLES: &[&str] = &[
    "The Last Frontier", "Night Rain Over the River", "Lanterns of the Drowned Harbor",
    "The Bronze Heart", "Letters from the North", "A City Under Two Moons",
    "The Cartographer's Debt", "Echoes in the Deep", "Stormwatch", "The Sleeping Crown",
    "Salt and Circuitry", "The Glass Orchard",
];
const GENRES: &[&str] = &[
    "science fiction", "wuxia", "corporate thriller", "high fantasy", "mystery",
    "historical drama", "steampunk", "urban fantasy",
];
const SETTING_FRAGMENTS: &[&str] = &[
    "a flooded harbor city where every lantern is said to hold a drowned sailor's memory",
    "the outer rim of a colonized galaxy, three centuries after the first generation ships",
    "a mountain monastery that only appears during the winter solstice",
    "a desert archipelago of floating market towns tethered to ancient chains",
    "a steam-driven capital whose clocks are wound by a guild of silent engineers",
    "the last university on a continent swallowed by an endless autumn forest",
    "a border fortress between two kingdoms that both claim to be the rightful heir",
    "an orbital station where the air is rationed by lottery every morning",
];
const CONFLICT_FRAGMENTS: &[&str] = &[
    "a colony ship lost for a century returns carrying clones of its founders",
    "a forbidden manual of martial technique resurfaces and every sect wants it",
    "an engineer discovers that the city's heart is a living creature in pain",
    "the heir to the throne is revealed to be an imposter raised by the enemy",
    "the tide stops rising and the harbor's bargain with the sea begins to fail",
    "a rival guild frames the protagonist for sabotage on the eve of a treaty",
    "a prophecy names two people as the saviour and only one can survive",
    "the archive that records every promise in the kingdom begins to burn",
];
const THEMES: &[&str] = &[
    "identity", "sacrifice", "loyalty", "ambition", "memory", "redemption", "freedom",
    "the cost of progress", "family", "trust", "grief", "justice",
];
const TONES: &[&str] = &[
    "epic and mysterious", "tense and cerebral", "melancholic", "romantic and tragic",
    "darkly humorous", "hopeful",
];
const AUDIENCES: &[&str] = &[
    "young adult readers", "adult science fiction fans", "fans of martial arts epics",
    "readers of literary mysteries", "general audiences aged 16 and up",
];
const NAMES: &[&str] = &[
    "Lin Yue", "Aria Vance", "Kestrel", "Marcus Hale", "Ione", "Bao Shen", "Tamsin Reed",
    "Old Wen", "Corvin", "Juno Saito", "Elias Thorn", "Mira Quell", "Daxos", "Sable",
    "Hana Ito",
];
const ARCHETYPES: [&str; 5] = ["hero", "loyal companion", "shadow", "mentor", "trickster"];
const BACKGROUNDS: &[&str] = &[
    "Raised by smugglers after a shipwreck took both parents.",
    "The youngest archivist in the city, demoted for asking the wrong question.",
    "A former soldier who deserted rather than burn a village.",
    "Heir to a disgraced merchant house trying to buy back its name.",
    "A street performer who learned to read minds by reading faces.",
    "Once the finest duelist in the capital, now blind in one eye.",
    "A clockmaker's apprentice who can hear machines breathe.",
    "Grew up in the monastery and has never seen the sea.",
    "A courier who has memorized every road and every lie told on them.",
    "An exiled scholar whose banned theory turned out to be true.",
];
const MOTIVATIONS: &[&str] = &[
    "To learn who they were before the wreck.",
    "To protect the only family they have left.",
    "To prove the old prophecy wrong.",
    "To pay a debt that cannot be paid in coin.",
    "To see the city free, whatever it costs.",
    "To be remembered.",
    "To win back the trust they squandered.",
    "To find the door the archive keeps hidden.",
    "To outlive the enemy who spared them.",
    "To make the powerful answer for one night's crime.",
];
const SKILLS: &[&str] = &[
    "swordsmanship", "lockpicking", "navigation", "diplomacy", "alchemy", "archery",
    "forgery", "medicine", "engineering", "stealth", "cartography", "persuasion",
];
const TRAITS: &[&str] = &[
    "stubborn", "curious", "quietly kind", "reckless", "calculating", "loyal", "sardonic",
    "haunted", "warm", "proud", "patient", "restless",
];
const RELATIONS: &[&str] = &[
    "trusted friend", "bitter rival", "former student", "owes a life debt to",
    "secretly related to", "uneasy ally",
];
const CHAPTER_TITLES: &[&str] = &[
    "The Calm Before", "An Unexpected Guest", "First Trial", "The Map Beneath", "Crossing",
    "Broken Oaths", "The Truth Surfaces", "Darkest Hour", "Counterstrike", "The Masked Court",
    "Ashes and Ink", "Final Reckoning", "A New Dawn", "The Long Night", "Storm Signal",
    "Under the Lanterns", "The Price", "Thresholds", "What the Tide Kept", "Homecoming",
];
const ARC_BEATS: &[&str] = &[
    "The protagonist's ordinary life is interrupted by a stranger's warning.",
    "An old friend returns with a map nobody should have.",
    "The first choice costs more than anyone expected.",
    "A hidden archive reveals the city's founding lie.",
    "Allies split over how far they are willing to go.",
    "The rival makes an offer that is hard to refuse.",
    "Everything is lost in a single night of fire.",
    "The mentor's secret changes the meaning of the quest.",
    "A desperate plan turns the enemy's strength against them.",
    "The court gathers and every mask comes off.",
    "The final confrontation forces an impossible choice.",
    "The survivors decide what kind of world comes next.",
    "A betrayal is revealed to have been mercy all along.",
    "The wildcard chooses a side at the worst possible moment.",
    "A quiet moment between battles rekindles an old bond.",
];
const HOOKS: &[&str] = &[
    "Who sent the warning?", "What is buried under the lighthouse?",
    "Can a promise outlive the person who made it?", "Which ally is the informant?",
    "Why does the mentor avoid the capital?", "What did the tide take in return?",
];
const SUBJECTS: &[&str] = &[
    "The lantern keeper", "Her brother", "The old captain", "A child at the window",
    "The rival", "The mentor", "Someone in the crowd", "The wind", "The city watch",
    "A gull", "The stranger", "Their shadow",
];
const VERBS: &[&str] = &[
    "watched", "followed", "whispered about", "turned away from", "reached for",
    "remembered", "feared", "circled", "bargained for", "ignored", "studied", "guarded",
];
const OBJECTS: &[&str] = &[
    "the burning ledger", "a rusted key", "the silver compass", "the last letter",
    "an unmarked door", "the tide charts", "a cracked mask", "the harbor bell",
    "a bundle of maps", "the empty throne", "the broken clock", "a sealed jar of salt",
];
const PLACES: &[&str] = &[
    "beneath the lighthouse", "along the flooded quay", "in the archive's lowest vault",
    "at the edge of the market", "under a sky the colour of slate", "behind the chapel",
    "on the crumbling sea wall", "as the bells began to ring", "in the hour before dawn",
    "while the rain thickened",
];
const DIALOGUE: &[&str] = &[
    "\"We should not be here,\" someone said quietly.",
    "\"Keep walking and do not look back.\"",
    "\"You knew all along, didn't you?\"",
    "\"If the bell rings twice, run.\"",
    "\"Trust me one more time.\"",
    "\"The sea always collects its debts.\"",
];
const CHOICE_TEXTS: &[&str] = &[
    "Follow the stranger into the fog", "Confront the mentor with the letter",
    "Burn the ledger before anyone reads it", "Ring the harbor bell",
    "Hide the key and say nothing", "Ask the rival for help",
    "Go back for the missing child", "Open the unmarked door",
];
const ATTRIBUTES: &[&str] = &[
    "courage", "trust", "suspicion", "reputation", "wealth", "health", "insight", "loyalty",
];

fn pick<'a>(rng: &mut StdRng, pool: &[&'a str]) -> &'a str {
    pool.choose(rng).copied().unwrap_or_default()
}

fn pick_many(rng: &mut StdRng, pool: &[&str], count: usize) -> Vec<String> {
    pool.choose_multiple(rng, count)
        .map(|s| (*s).to_string())
        .collect()
}

fn sentence(rng: &mut StdRng) -> String {
    if rng.random_range(0..5) == 0 {
        return pick(rng, DIALOGUE).to_string();
    }
    format!(
        "{} {} {} {}.",
        pick(rng, SUBJECTS),
        pick(rng, VERBS),
        pick(rng, OBJECTS),
        pick(rng, PLACES)
    )
}

pub struct MockGenerator {
    rng: Mutex<StdRng>,
    quality: f64,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_rng(&mut rand::rng()), 1.0)
    }

    /// Deterministic output for a given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed), 1.0)
    }

    /// `quality` in [0, 1]: the chance an output keeps every field.
    pub fn with_quality(mut self, quality: f64) -> Self {
        self.quality = quality.clamp(0.0, 1.0);
        self
    }

    fn from_rng(rng: StdRng, quality: f64) -> Self {
        Self {
            rng: Mutex::new(rng),
            quality,
        }
    }

    fn compose(&self, request: &TaskRequest) -> (Value, f64) {
        let mut guard = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let rng: &mut StdRng = &mut guard;

        let mut output = match request.task_type {
            TaskType::Blueprint => blueprint(rng),
            TaskType::Characters => characters(rng),
            TaskType::StoryArc => story_arc(rng),
            TaskType::Chapters => chapters(rng, request.chapter_ids.as_deref().unwrap_or(&[1])),
        };

        if rng.random::<f64>() >= self.quality
            && let Some(map) = output.as_object_mut()
        {
            let keys: Vec<String> = map.keys().cloned().collect();
            if let Some(key) = keys.choose(rng) {
                map.remove(key);
            }
        }

        let generation_time = rng.random_range(1.5..8.0);
        (output, generation_time)
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn blueprint(rng: &mut StdRng) -> Value {
    let setting = pick_many(rng, SETTING_FRAGMENTS, 2).join(", beside ");
    let conflict = pick_many(rng, CONFLICT_FRAGMENTS, 2).join(", while ");
    let theme_count = rng.random_range(2..=4);
    json!({
        "title": pick(rng, TITLES),
        "genre": pick(rng, GENRES),
        "setting": format!("The story unfolds in {setting}."),
        "core_conflict": format!("Everything changes when {conflict}."),
        "themes": pick_many(rng, THEMES, theme_count),
        "tone": pick(rng, TONES),
        "target_audience": pick(rng, AUDIENCES),
    })
}

fn characters(rng: &mut StdRng) -> Value {
    let names = pick_many(rng, NAMES, CHARACTER_IDS.len());
    let cast: Vec<Value> = CHARACTER_IDS
        .iter()
        .zip(ARCHETYPES)
        .zip(&names)
        .map(|((id, archetype), name)| {
            let relationships: Map<String, Value> = CHARACTER_IDS
                .iter()
                .filter(|other| *other != id)
                .take(2)
                .map(|other| ((*other).to_string(), Value::from(pick(rng, RELATIONS))))
                .collect();
            json!({
                "id": id,
                "name": name,
                "archetype": archetype,
                "background": pick(rng, BACKGROUNDS),
                "motivation": pick(rng, MOTIVATIONS),
                "skills": pick_many(rng, SKILLS, 3),
                "personality_traits": pick_many(rng, TRAITS, 3),
                "relationships": relationships,
            })
        })
        .collect();
    json!({ "characters": cast })
}

fn story_arc(rng: &mut StdRng) -> Value {
    let mut titles = pick_many(rng, CHAPTER_TITLES, 12);
    titles.shuffle(rng);
    let chapters: Vec<Value> = titles
        .iter()
        .enumerate()
        .map(|(i, title)| {
            let id = i + 1;
            #[allow(clippy::cast_precision_loss)]
            let progress = (id as f64 / 12.0 * 100.0).round() / 100.0;
            let focus_count = rng.random_range(1..=2);
            let focus = pick_many(rng, &CHARACTER_IDS, focus_count);
            json!({
                "id": id,
                "title": title,
                "description": format!("{} {}", pick(rng, ARC_BEATS), pick(rng, ARC_BEATS)),
                "storyProgress": progress,
                "characterFocus": focus,
            })
        })
        .collect();
    json!({
        "title": pick(rng, TITLES),
        "description": format!("A story about {} and {}.", pick(rng, THEMES), pick(rng, THEMES)),
        "chapters": chapters,
        "arcs": {
            "act1": {"chapters": [1, 2, 3]},
            "act2a": {"chapters": [4, 5, 6]},
            "act2b": {"chapters": [7, 8, 9]},
            "act3": {"chapters": [10, 11, 12]},
        },
        "themes": pick_many(rng, THEMES, 3),
        "hooks": pick_many(rng, HOOKS, 3),
    })
}

fn chapters(rng: &mut StdRng, ids: &[u32]) -> Value {
    let chapters: Vec<Value> = ids
        .iter()
        .map(|id| {
            let target_len = rng.random_range(1100..2200);
            let mut content = String::new();
            while content.len() < target_len {
                if !content.is_empty() {
                    content.push(' ');
                }
                content.push_str(&sentence(rng));
            }
            let choice_count = rng.random_range(2..=4);
            let choices: Vec<Value> = pick_many(rng, CHOICE_TEXTS, choice_count)
                .into_iter()
                .map(|text| {
                    let consequences: Map<String, Value> = pick_many(rng, ATTRIBUTES, 2)
                        .into_iter()
                        .map(|attr| (attr, Value::from(rng.random_range(-3..=3))))
                        .collect();
                    json!({
                        "text": text,
                        "nextChapter": id + 1,
                        "consequences": consequences,
                    })
                })
                .collect();
            json!({
                "id": id,
                "title": pick(rng, CHAPTER_TITLES),
                "content": content,
                "choices": choices,
            })
        })
        .collect();
    json!({ "chapters": chapters })
}

impl ContentGenerator for MockGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    fn mode(&self) -> GenerationMode {
        GenerationMode::Mock
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
            provider: Some("storyfi".into()),
            ..ModelInfo::new(GenerationMode::Mock, "mock-story-generator")
        }
    }

    fn generate<'a>(&'a self, request: &'a TaskRequest) -> GenerateFuture<'a> {
        Box::pin(async move {
            let (output, generation_time) = self.compose(request);
            let mut metadata = Map::new();
            metadata.insert("quality".into(), Value::from(self.quality));
            Ok(GeneratedContent {
                generated_content: output.to_string(),
                model: "mock-story-generator".into(),
                mode: GenerationMode::Mock,
                generation_time,
                metadata,
            })
        })
    }
}
