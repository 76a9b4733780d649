//! Core domain model
//!
//! This module defines the building blocks every pipeline is made of:
//! outcomes, steps, errors and the pipeline builder itself.

pub mod error;
pub mod outcome;
pub mod pipeline;
pub mod step;

pub use error::{Error, MatchError, PipelineError, Result};
pub use outcome::{is_deferred, BoxFuture, Outcome};
pub use pipeline::{CatchState, Caught, Pipeline, Settled, Uncaught};
pub use step::{Step, StepKind};
