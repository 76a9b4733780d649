//! Error types

use thiserror::Error;

/// Error channel shared by every step, handler and composed pipeline
pub type Error = anyhow::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures raised by the match engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("condition cannot be deferred (arm {index})")]
    DeferredCondition { index: usize },

    #[error("no condition matched and no fallback was provided")]
    Unmatched,
}

/// Failures raised while composing a pipeline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("cannot compose an empty pipeline")]
    Empty,
}
