#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::unnecessary_literal_bound,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod config;
pub mod error;
pub mod generator;
#[doc(hidden)]
pub mod judge;
pub mod llm;
pub mod narrative;
pub mod observability;
pub mod peer;
pub mod protocol;
pub mod reputation;
pub mod scoring;
pub mod validator;

pub use config::Config;
pub use error::{Result, StoryError};
pub use protocol::{TaskRequest, TaskResponse, TaskType};
pub use scoring::{ScoreBreakdown, ScoringPipeline};
pub use validator::Validator;
