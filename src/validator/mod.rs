//! The validator loop: pick a task, query peers, score, track reputation, set weights.

pub mod runner;
pub mod selection;
pub mod sink;
pub mod stats;
pub mod tasks;

pub use runner::{StepReport, Validator};
pub use selection::select_peers;
pub use sink::{LogWeightSink, MemoryWeightSink, WeightSink};
pub use stats::ValidatorStats;
pub use tasks::{SAMPLE_PROMPTS, build_task, choose_task_type, random_task};
