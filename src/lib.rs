//! typepipe - Composable pipelines threading a value, a context and a global
//!
//! Steps may answer synchronously or hand back deferred work; a pipeline
//! stays synchronous until the first deferred step and then chains the rest
//! after it. See [`Pipeline`] for the builder and [`steps`] for the reusable
//! step factories.

pub mod chat;
pub mod cli;
pub mod core;
pub mod execution;
pub mod steps;

// Re-export commonly used types
pub use core::{is_deferred, Error, MatchError, Outcome, PipelineError, Result};
pub use core::{CatchState, Caught, Pipeline, Settled, Step, StepKind, Uncaught};
pub use execution::Composed;
pub use steps::{Match, Matcher};
