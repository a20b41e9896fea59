use storyfi::config::{CONTENT_MAX, NARRATIVE_MAX, PointBudget, STRUCTURE_MAX, TECHNICAL_MAX};
use storyfi::generator::MockGenerator;
use storyfi::peer::LocalPeer;
use storyfi::protocol::{TaskResponse, TaskType};
use storyfi::reputation::HistoryStore;
use storyfi::scoring::{ScoringPipeline, score_technical};
use storyfi::validator::build_task;
use storyfi::Config;
use strum::IntoEnumIterator;

use crate::fixtures::{local_model, response, rich_blueprint};

#[tokio::test]
async fn every_component_stays_within_its_range() {
    let mut config = Config::default();
    // Only exact copies count; mock outputs share vocabulary.
    config.scoring.plagiarism.cross_peer_threshold = 0.999;
    config.scoring.plagiarism.history_threshold = 0.999;
    let pipeline = ScoringPipeline::from_config(&config);
    let mut history = HistoryStore::new(100);

    for seed in 0..6_u64 {
        let quality = if seed % 2 == 0 { 1.0 } else { 0.0 };
        let peer = LocalPeer::new(
            format!("m{seed}").as_str(),
            Box::new(MockGenerator::with_seed(seed).with_quality(quality)),
            5,
        );
        for task_type in TaskType::iter() {
            let request = build_task(task_type, "a story about a lighthouse");
            let reply: TaskResponse = peer.respond(&request).await;
            let result = pipeline
                .score(&request, &reply, std::slice::from_ref(&reply), &history)
                .await;

            assert!(result.technical.raw <= TECHNICAL_MAX + 1e-9);
            assert!(result.structure.raw <= STRUCTURE_MAX + 1e-9);
            assert!(result.content.raw <= CONTENT_MAX + 1e-9);
            assert!(result.narrative.raw <= NARRATIVE_MAX + 1e-9);
            assert!((0.0..=100.0).contains(&result.total), "{task_type}: {}", result.total);

            if let Some(output) = &reply.output {
                history.record(reply.responder.clone(), task_type, output, result.total);
            }
        }
    }
}

#[test]
fn dropping_a_required_field_lowers_technical_score() {
    let complete = response("p", TaskType::Blueprint, rich_blueprint(), local_model());
    let mut partial_value = rich_blueprint();
    partial_value.as_object_mut().unwrap().remove("tone");
    let partial = response("p", TaskType::Blueprint, partial_value, local_model());

    let fields = TaskType::Blueprint.required_output_fields();
    let budget = PointBudget::default().technical;
    let a = score_technical(complete.output.as_ref().unwrap(), 5.0, TaskType::Blueprint, fields, budget);
    let b = score_technical(partial.output.as_ref().unwrap(), 5.0, TaskType::Blueprint, fields, budget);
    assert!(a.raw > b.raw);
}
