pub mod schema;

pub use schema::{
    CONTENT_MAX, Config, ContentConfig, DimensionWeights, GeneratorConfig, NARRATIVE_MAX,
    NarrativeConfig, ObservabilityConfig, PlagiarismConfig, PointBudget, ReputationConfig,
    STRUCTURE_MAX, ScoringConfig, TECHNICAL_MAX, TaskDistribution, ValidatorConfig,
};
