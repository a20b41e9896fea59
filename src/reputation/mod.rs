//! Long-run peer reputation: response history, EMA tracking and weights.

pub mod history;
pub mod tracker;
pub mod weights;

pub use history::{HistoryEntry, HistoryStore};
pub use tracker::{ReputationState, ReputationTracker, ViolationOutcome};
pub use weights::WeightCalculator;
