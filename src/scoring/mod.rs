//! Response evaluation: four sub-scorers, plagiarism screening and the
//! model-quality policy, combined by [`ScoringPipeline`].

pub mod breakdown;
pub mod content;
pub mod pipeline;
pub mod plagiarism;
pub mod policy;
pub mod schema;
pub mod similarity;
pub mod structure;
pub mod technical;

pub use breakdown::{ComponentScore, EvaluationStatus, ScoreBreakdown};
pub use content::ContentScorer;
pub use pipeline::ScoringPipeline;
pub use plagiarism::{PlagiarismDetector, PlagiarismKind, PlagiarismVerdict};
pub use policy::{ModelPolicy, PolicyAdjustment, PolicyEngine, PolicyOutcome, RecommendedModel};
pub use similarity::{bigram_jaccard, content_hash};
pub use structure::score_structure;
pub use technical::score_technical;

/// `part / whole`, or 0 when `whole` is 0.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}
