//! Miner-side content generation backends.

pub mod api;
pub mod endpoint;
pub mod factory;
pub mod mock;
pub mod prompt;
pub mod script;
pub mod traits;

pub use api::ApiGenerator;
pub use endpoint::EndpointGenerator;
pub use factory::create_generator;
pub use mock::MockGenerator;
pub use prompt::build_task_prompt;
pub use script::ScriptGenerator;
pub use traits::{ContentGenerator, GenerateFuture, GeneratedContent, generate_with_timeout};
