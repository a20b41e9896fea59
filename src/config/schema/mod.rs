mod core;
mod generator;
mod narrative;
mod observability;
mod reputation;
mod scoring;
mod validator;

pub use self::core::Config;
pub use generator::GeneratorConfig;
pub use narrative::{DimensionWeights, NarrativeConfig};
pub use observability::ObservabilityConfig;
pub use reputation::ReputationConfig;
pub use scoring::{
    CONTENT_MAX, ContentConfig, NARRATIVE_MAX, PlagiarismConfig, PointBudget, STRUCTURE_MAX,
    ScoringConfig, TECHNICAL_MAX,
};
pub use validator::{TaskDistribution, ValidatorConfig};
