//! Narrative judges: anything that turns a rubric prompt into a raw text reply.

pub mod chat;
pub mod custom;
pub mod factory;
pub mod reliable;
pub mod traits;

pub use chat::{ChatJudge, JUDGE_SYSTEM_PROMPT};
pub use custom::CustomJudge;
pub use factory::{create_judge, default_judge_model};
pub use reliable::ReliableJudge;
pub use traits::Judge;
