use thiserror::Error;

/// Failure taxonomy for the assistant. Every variant is recovered locally
/// and turned into a user-facing string; none of these abort the
/// conversation loop.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AssistantError {
    /// The expression text is not syntactically valid arithmetic.
    #[error("could not parse expression: {0}")]
    Parse(String),

    /// The expression parsed but did not produce a finite real number.
    #[error("expression has no finite value: {0}")]
    Evaluation(String),

    /// The current environment has no speech recognition backend.
    #[error("speech recognition is not available in this environment")]
    UnsupportedEnvironment,

    /// The outbound search request failed or was blocked.
    #[error("search request failed: {0}")]
    Network(String),
}
