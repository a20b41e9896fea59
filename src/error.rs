use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `StoryFi`.
///
/// Scoring itself never returns these: per-response failures are recorded in
/// the score breakdown. These cover the surfaces around scoring (configuration,
/// task construction, content generation, the peer registry).
#[derive(Debug, Error)]
pub enum StoryError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Task protocol ───────────────────────────────────────────────────
    #[error("task: {0}")]
    Task(#[from] TaskError),

    // ── Content generation ──────────────────────────────────────────────
    #[error("generation: {0}")]
    Generation(#[from] GenerationError),

    // ── Peer registry ───────────────────────────────────────────────────
    #[error("registry: {0}")]
    Registry(#[from] RegistryError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Task errors ─────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("unknown task type '{0}'")]
    UnknownTaskType(String),

    #[error("{task} task requires upstream artifact '{artifact}'")]
    MissingArtifact {
        task: &'static str,
        artifact: &'static str,
    },

    #[error("chapters task requires at least one chapter id")]
    EmptyChapterIds,
}

// ─── Content generation errors ───────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generator {generator} timed out after {timeout_secs}s")]
    Timeout { generator: String, timeout_secs: u64 },

    #[error("generator {generator} failed: {message}")]
    Backend { generator: String, message: String },

    #[error("generator {generator} returned unusable output: {message}")]
    InvalidOutput { generator: String, message: String },

    #[error("generator misconfigured: {0}")]
    Config(String),
}

// ─── Peer registry errors ────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("peer registry unavailable: {0}")]
    Unavailable(String),

    #[error("peer registry is empty")]
    Empty,
}

pub type Result<T, E = StoryError> = std::result::Result<T, E>;
