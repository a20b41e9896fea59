use std::sync::Arc;
use std::time::Duration;

use storyfi::Config;
use storyfi::error::GenerationError;
use storyfi::generator::{ContentGenerator, GenerateFuture, MockGenerator};
use storyfi::observability::CountingObserver;
use storyfi::peer::{LocalNetwork, LocalPeer, Peer, StaticRegistry};
use storyfi::protocol::{GenerationMode, ModelInfo, PeerId, TaskRequest, TaskType};
use storyfi::scoring::EvaluationStatus;
use storyfi::validator::{MemoryWeightSink, SAMPLE_PROMPTS, Validator, build_task};

fn config(max_steps: u64) -> Config {
    let mut config = Config::default();
    config.validator.query_interval_secs = 0;
    config.validator.sample_size = 16;
    config.validator.batch_timeout_secs = 5;
    config.validator.weight_update_frequency = 2;
    config.validator.max_steps = Some(max_steps);
    config.scoring.plagiarism.cross_peer_threshold = 0.999;
    config.scoring.plagiarism.history_threshold = 0.999;
    config
}

/// Honest peers get distinct seeds; each `copycat-N` mirrors `peer-N`.
fn swarm(honest: u32, copycats: u32) -> (Vec<Peer>, LocalNetwork) {
    let mut network = LocalNetwork::new();
    let mut roster = Vec::new();
    let mut uid = 0_u16;
    let mut add = |id: String, seed: u64, stake: f64| {
        network.insert(LocalPeer::new(id.as_str(), Box::new(MockGenerator::with_seed(seed)), 5));
        roster.push(Peer::new(id, uid, stake));
        uid += 1;
    };
    for i in 0..honest {
        add(format!("peer-{i}"), 1000 + u64::from(i), 100.0 * f64::from(i + 1));
    }
    for i in 0..copycats {
        add(format!("copycat-{i}"), 1000 + u64::from(i), 50.0);
    }
    (roster, network)
}

#[tokio::test]
async fn copycats_are_blacklisted_and_dropped_from_weights() {
    let (roster, network) = swarm(4, 1);
    let sink = Arc::new(MemoryWeightSink::new());
    let observer = Arc::new(CountingObserver::new());
    let mut validator = Validator::new(
        &config(4),
        Arc::new(StaticRegistry::new(roster)),
        Arc::new(network),
    )
    .with_seed(21)
    .with_sink(Box::new(sink.clone()))
    .with_observer(observer.clone());

    let stats = validator.run().await.unwrap();
    assert_eq!(stats.steps, 4);
    assert_eq!(stats.weight_updates, 2);
    assert_eq!(stats.blacklisted, 2);

    let tracker = validator.tracker();
    assert!(tracker.is_blacklisted(&PeerId::new("peer-0")));
    assert!(tracker.is_blacklisted(&PeerId::new("copycat-0")));
    assert!(!tracker.is_blacklisted(&PeerId::new("peer-1")));

    let weights = sink.last().unwrap();
    assert_eq!(weights.len(), 3);
    assert!(!weights.contains_key(&PeerId::new("copycat-0")));
    let total: f64 = weights.values().sum();
    assert!((total - 1.0).abs() < 1e-9);
    assert!(weights.values().all(|w| *w > 0.0));

    let counts = observer.counts();
    assert_eq!(counts.blacklisted, 2);
    assert_eq!(counts.plagiarism, 6);
    assert_eq!(counts.steps, 4);
    assert_eq!(counts.weight_updates, 2);
}

#[tokio::test]
async fn every_stage_of_the_story_is_scored() {
    let (roster, network) = swarm(3, 0);
    let mut validator = Validator::new(
        &config(4),
        Arc::new(StaticRegistry::new(roster)),
        Arc::new(network),
    )
    .with_seed(3);

    for task_type in [
        TaskType::Blueprint,
        TaskType::Characters,
        TaskType::StoryArc,
        TaskType::Chapters,
    ] {
        let report = validator
            .step_with(build_task(task_type, SAMPLE_PROMPTS[1]))
            .await
            .unwrap();
        assert_eq!(report.task_type, task_type);
        assert_eq!(report.scores.len(), 3);
        for (peer, breakdown) in &report.scores {
            assert_eq!(breakdown.status, EvaluationStatus::Scored, "{peer} on {task_type}");
            assert!(breakdown.structure.points > 0.0, "{peer} on {task_type}");
            assert!(breakdown.total > 0.0 && breakdown.total <= 100.0);
        }
    }

    assert_eq!(validator.history().len(), 12);
    let stats = validator.stats();
    assert_eq!(stats.successful, 12);
    assert!(stats.average_reward() > 0.0);
    assert!((stats.success_rate() - 1.0).abs() < f64::EPSILON);
}

/// Either hangs past any deadline or fails the same way every time.
struct Broken {
    stall: bool,
}

impl ContentGenerator for Broken {
    fn name(&self) -> &str {
        "broken"
    }

    fn mode(&self) -> GenerationMode {
        GenerationMode::Local
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo::new(GenerationMode::Local, "qwen2.5-7b")
    }

    fn generate<'a>(&'a self, _request: &'a TaskRequest) -> GenerateFuture<'a> {
        Box::pin(async move {
            if self.stall {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            Err(GenerationError::Backend {
                generator: "broken".into(),
                message: "model not loaded".into(),
            })
        })
    }
}

#[tokio::test(start_paused = true)]
async fn stalled_generators_are_never_blacklisted() {
    let (mut roster, mut network) = swarm(2, 0);
    for (i, (id, stall)) in [
        ("stalled-0", true),
        ("stalled-1", true),
        ("failing-0", false),
        ("failing-1", false),
    ]
    .into_iter()
    .enumerate()
    {
        network.insert(LocalPeer::new(id, Box::new(Broken { stall }), 1));
        roster.push(Peer::new(id.to_string(), 2 + u16::try_from(i).unwrap(), 10.0));
    }
    let observer = Arc::new(CountingObserver::new());
    let mut validator = Validator::new(
        &config(6),
        Arc::new(StaticRegistry::new(roster)),
        Arc::new(network),
    )
    .with_seed(5)
    .with_observer(observer.clone());

    for _ in 0..6 {
        let report = validator
            .step_with(build_task(TaskType::Blueprint, SAMPLE_PROMPTS[0]))
            .await
            .unwrap();
        assert_eq!(report.scores.len(), 6);
        for (peer, breakdown) in &report.scores {
            let expected = match peer.as_str() {
                id if id.starts_with("stalled") => EvaluationStatus::Absent,
                id if id.starts_with("failing") => EvaluationStatus::GenerationFailed,
                _ => EvaluationStatus::Scored,
            };
            assert_eq!(breakdown.status, expected, "{peer}");
            if expected != EvaluationStatus::Scored {
                assert!(breakdown.total.abs() < f64::EPSILON, "{peer}");
            }
        }
    }

    assert!(validator.tracker().blacklisted().is_empty());
    let counts = observer.counts();
    assert_eq!(counts.plagiarism, 0);
    assert_eq!(counts.blacklisted, 0);
    assert_eq!(validator.history().len(), 12);
}
