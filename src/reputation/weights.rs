use super::history::HistoryStore;
use crate::config::ReputationConfig;
use crate::protocol::PeerId;
use std::collections::{BTreeMap, HashMap};

/// Turns EMA scores, stake and long-run averages into normalized weights.
#[derive(Debug, Clone)]
pub struct WeightCalculator {
    stake_share: f64,
    quality_share: f64,
    history_share: f64,
    temperature: f64,
    min_weight: f64,
    history_window: usize,
}

impl WeightCalculator {
    pub fn new(config: &ReputationConfig) -> Self {
        Self {
            stake_share: config.stake_share,
            quality_share: config.quality_share,
            history_share: config.history_share,
            temperature: config.temperature,
            min_weight: config.min_weight,
            history_window: config.history_window,
        }
    }

    /// Composite in roughly [0, 1]: stake fraction, EMA quality and historical average.
    ///
    /// A peer without stake data gets no stake credit. A peer without history
    /// uses its EMA as its historical average.
    pub fn composite(&self, ema: f64, stake_fraction: f64, historical_average: Option<f64>) -> f64 {
        let historical = historical_average.unwrap_or(ema);
        (self.stake_share * stake_fraction
            + self.quality_share * (ema / 100.0)
            + self.history_share * (historical / 100.0))
            .max(0.0)
    }

    pub fn compute(
        &self,
        ema_scores: &BTreeMap<PeerId, f64>,
        stakes: &HashMap<PeerId, f64>,
        history: &HistoryStore,
    ) -> BTreeMap<PeerId, f64> {
        if ema_scores.is_empty() {
            return BTreeMap::new();
        }

        let max_stake = stakes
            .values()
            .copied()
            .filter(|s| s.is_finite())
            .fold(0.0_f64, f64::max);

        let incentives: BTreeMap<PeerId, f64> = ema_scores
            .iter()
            .map(|(peer, &ema)| {
                let stake_fraction = match stakes.get(peer) {
                    Some(&stake) if max_stake > 0.0 && stake.is_finite() => {
                        (stake / max_stake).clamp(0.0, 1.0)
                    }
                    _ => 0.0,
                };
                let historical = history.peer_average(peer, self.history_window);
                let composite = self.composite(ema, stake_fraction, historical);
                (peer.clone(), composite.powf(self.temperature))
            })
            .collect();

        apply_floor(normalize(incentives), self.min_weight)
    }
}

/// Scales values to sum to 1.0; an all-zero map becomes uniform.
pub fn normalize(values: BTreeMap<PeerId, f64>) -> BTreeMap<PeerId, f64> {
    let total: f64 = values.values().sum();
    if total > 0.0 && total.is_finite() {
        values.into_iter().map(|(k, v)| (k, v / total)).collect()
    } else {
        uniform(values.into_keys())
    }
}

fn uniform(keys: impl ExactSizeIterator<Item = PeerId>) -> BTreeMap<PeerId, f64> {
    #[allow(clippy::cast_precision_loss)]
    let share = 1.0 / keys.len().max(1) as f64;
    keys.map(|k| (k, share)).collect()
}

/// Raises every weight to at least `floor` and renormalizes the rest so the
/// map still sums to 1.0.
///
/// Weights pinned at the floor are excluded from the renormalization, so
/// renormalizing never pushes them back under it. When the floor alone would
/// exceed the whole budget, weights become uniform.
pub fn apply_floor(weights: BTreeMap<PeerId, f64>, floor: f64) -> BTreeMap<PeerId, f64> {
    let n = weights.len();
    if n == 0 || floor <= 0.0 {
        return weights;
    }
    #[allow(clippy::cast_precision_loss)]
    let floor_total = floor * n as f64;
    if floor_total >= 1.0 {
        return uniform(weights.into_keys());
    }

    let (peers, values): (Vec<PeerId>, Vec<f64>) = weights.into_iter().unzip();
    let mut pinned = vec![false; n];
    loop {
        let pinned_count = pinned.iter().filter(|p| **p).count();
        #[allow(clippy::cast_precision_loss)]
        let budget = 1.0 - floor * pinned_count as f64;
        let free_sum: f64 = values
            .iter()
            .zip(&pinned)
            .filter(|(_, p)| !**p)
            .map(|(v, _)| *v)
            .sum();
        let scale = if free_sum > 0.0 { budget / free_sum } else { 0.0 };

        let mut changed = false;
        for (value, pin) in values.iter().zip(pinned.iter_mut()) {
            if !*pin && value * scale < floor {
                *pin = true;
                changed = true;
            }
        }
        if !changed {
            return peers
                .into_iter()
                .zip(values.iter().zip(&pinned))
                .map(|(peer, (value, pin))| (peer, if *pin { floor } else { value * scale }))
                .collect();
        }
    }
}
