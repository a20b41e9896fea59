use crate::peer::Peer;
use crate::reputation::ReputationTracker;
use rand::Rng;
use rand::seq::IndexedRandom;
use std::cmp::Ordering;

/// Picks up to `sample_size` non-blacklisted peers: the best `exploit_share`
/// by EMA, then a random draw from the remainder.
pub fn select_peers<R: Rng + ?Sized>(
    peers: &[Peer],
    tracker: &ReputationTracker,
    sample_size: usize,
    exploit_share: f64,
    rng: &mut R,
) -> Vec<Peer> {
    let mut available: Vec<&Peer> = peers
        .iter()
        .filter(|p| !tracker.is_blacklisted(&p.id))
        .collect();
    if available.is_empty() || sample_size == 0 {
        return Vec::new();
    }

    let wanted = sample_size.min(available.len());
    available.sort_by(|a, b| {
        let ea = tracker.ema(&a.id).unwrap_or(0.0);
        let eb = tracker.ema(&b.id).unwrap_or(0.0);
        eb.partial_cmp(&ea)
            .unwrap_or(Ordering::Equal)
            .then(a.uid.cmp(&b.uid))
    });

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let top_k = ((wanted as f64) * exploit_share.clamp(0.0, 1.0)).floor() as usize;
    let explore_k = wanted - top_k;

    let (top, rest) = available.split_at(top_k);
    let mut selected: Vec<Peer> = top.iter().map(|p| (*p).clone()).collect();
    selected.extend(rest.choose_multiple(rng, explore_k).map(|p| (*p).clone()));
    selected
}
