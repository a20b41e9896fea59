use storyfi::config::ReputationConfig;
use storyfi::protocol::PeerId;
use storyfi::reputation::ReputationTracker;

#[test]
fn ema_converges_to_a_repeated_score() {
    let mut tracker = ReputationTracker::from_config(&ReputationConfig::default());
    let peer = PeerId::new("steady");
    tracker.update_score(&peer, 0.0);

    // Gap shrinks by (1 - alpha) per update; 0.9^60 < 0.002.
    let mut ema = 0.0;
    for _ in 0..60 {
        ema = tracker.update_score(&peer, 80.0);
    }
    assert!((ema - 80.0).abs() < 0.2, "ema {ema}");
}

#[test]
fn first_score_initializes_without_blending() {
    let mut tracker = ReputationTracker::new(0.1, 3);
    let peer = PeerId::new("new");
    assert!((tracker.update_score(&peer, 64.0) - 64.0).abs() < f64::EPSILON);
    let blended = tracker.update_score(&peer, 4.0);
    assert!((blended - (0.1 * 4.0 + 0.9 * 64.0)).abs() < 1e-9);
}

#[test]
fn blacklist_latches_at_three_violations() {
    let mut tracker = ReputationTracker::from_config(&ReputationConfig::default());
    let peer = PeerId::new("copier");

    assert!(!tracker.record_violation(&peer).newly_blacklisted);
    assert!(!tracker.record_violation(&peer).newly_blacklisted);
    let third = tracker.record_violation(&peer);
    assert!(third.newly_blacklisted);
    assert_eq!(third.violation_count, 3);

    let fourth = tracker.record_violation(&peer);
    assert!(!fourth.newly_blacklisted);
    assert_eq!(fourth.violation_count, 4);
    assert!(tracker.is_blacklisted(&peer));

    // Good scores never clear the latch.
    for _ in 0..10 {
        tracker.update_score(&peer, 100.0);
    }
    assert!(tracker.is_blacklisted(&peer));
    assert!(!tracker.active_scores().contains_key(&peer));
}

#[test]
fn manual_reset_clears_the_latch_but_keeps_ema() {
    let mut tracker = ReputationTracker::new(0.5, 1);
    let peer = PeerId::new("forgiven");
    tracker.update_score(&peer, 40.0);
    tracker.record_violation(&peer);
    assert!(tracker.is_blacklisted(&peer));

    tracker.reset(&peer);
    let state = tracker.state(&peer).unwrap();
    assert!(!state.is_blacklisted);
    assert_eq!(state.violation_count, 0);
    assert!((state.ema_score - 40.0).abs() < f64::EPSILON);
}
