use std::collections::{BTreeMap, HashMap};

use storyfi::config::ReputationConfig;
use storyfi::protocol::{OutputData, PeerId, TaskType};
use storyfi::reputation::{HistoryStore, WeightCalculator};

fn peers(scores: &[(&str, f64)]) -> BTreeMap<PeerId, f64> {
    scores.iter().map(|(id, s)| (PeerId::new(*id), *s)).collect()
}

#[test]
fn weights_sum_to_one_and_respect_the_floor() {
    let config = ReputationConfig::default();
    let calculator = WeightCalculator::new(&config);
    let ema = peers(&[("a", 95.0), ("b", 60.0), ("c", 5.0), ("d", 0.0)]);
    let stakes = HashMap::from([(PeerId::new("a"), 1000.0), (PeerId::new("b"), 10.0)]);

    let weights = calculator.compute(&ema, &stakes, &HistoryStore::new(10));
    let total: f64 = weights.values().sum();
    assert!((total - 1.0).abs() < 1e-9);
    assert!(weights.values().all(|w| *w >= config.min_weight - 1e-12));
    assert!(weights[&PeerId::new("a")] > weights[&PeerId::new("b")]);
    assert!(weights[&PeerId::new("b")] > weights[&PeerId::new("c")]);
}

#[test]
fn all_zero_composites_fall_back_to_equal_weights() {
    let calculator = WeightCalculator::new(&ReputationConfig::default());
    let ema = peers(&[("a", 0.0), ("b", 0.0), ("c", 0.0), ("d", 0.0)]);
    let weights = calculator.compute(&ema, &HashMap::new(), &HistoryStore::new(10));
    for weight in weights.values() {
        assert!((weight - 0.25).abs() < 1e-9);
    }
}

#[test]
fn composite_blends_stake_quality_and_history() {
    let calculator = WeightCalculator::new(&ReputationConfig::default());
    let composite = calculator.composite(80.0, 0.5, Some(60.0));
    let expected = 0.15 * 0.5 + 0.75 * 0.8 + 0.10 * 0.6;
    assert!((composite - expected).abs() < 1e-9);

    // No history: the EMA stands in for the long-run average.
    let without = calculator.composite(80.0, 0.0, None);
    assert!((without - (0.75 * 0.8 + 0.10 * 0.8)).abs() < 1e-9);
}

#[test]
fn long_run_history_lifts_a_consistent_peer() {
    let calculator = WeightCalculator::new(&ReputationConfig::default());
    let mut history = HistoryStore::new(100);
    let output = OutputData::parse(r#"{"title": "x"}"#);
    for _ in 0..20 {
        history.record(PeerId::new("veteran"), TaskType::Blueprint, &output, 90.0);
        history.record(PeerId::new("newcomer"), TaskType::Blueprint, &output, 10.0);
    }

    let ema = peers(&[("veteran", 50.0), ("newcomer", 50.0)]);
    let weights = calculator.compute(&ema, &HashMap::new(), &history);
    assert!(weights[&PeerId::new("veteran")] > weights[&PeerId::new("newcomer")]);
}

#[test]
fn empty_input_yields_no_weights() {
    let calculator = WeightCalculator::new(&ReputationConfig::default());
    assert!(
        calculator
            .compute(&BTreeMap::new(), &HashMap::new(), &HistoryStore::new(1))
            .is_empty()
    );
}
