//! Step abstraction

use crate::core::outcome::Outcome;
use std::fmt;

/// A single unit of work in a pipeline
///
/// A step receives the current value by move and the context and global by
/// reference, and returns an [`Outcome`] that is either ready or deferred.
/// Every `Fn(V, &C, &G) -> Outcome<T>` closure is a step; so are composed
/// pipelines, composed matchers and the values built by the factories in
/// [`crate::steps`].
pub trait Step<V, C, G>: Send + Sync + 'static {
    /// Value handed to the next step
    type Output: Send + 'static;

    fn call(&self, value: V, context: &C, global: &G) -> Outcome<Self::Output>;
}

impl<F, V, C, G, T> Step<V, C, G> for F
where
    F: Fn(V, &C, &G) -> Outcome<T> + Send + Sync + 'static,
    T: Send + 'static,
{
    type Output = T;

    fn call(&self, value: V, context: &C, global: &G) -> Outcome<T> {
        self(value, context, global)
    }
}

/// What a registration appended to a pipeline's step list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    /// Raw step registered with `pipe` or `step`
    Pipe,
    /// Context replacement
    Context,
    /// Error handler installation
    Catch,
    Tap,
    Assert,
    IfElse,
    Match,
    Pairwise,
}

impl StepKind {
    /// Whether the step leaves the value untouched
    pub fn passes_value_through(&self) -> bool {
        matches!(self, StepKind::Context | StepKind::Catch | StepKind::Tap)
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepKind::Pipe => "pipe",
            StepKind::Context => "context",
            StepKind::Catch => "catch",
            StepKind::Tap => "tap",
            StepKind::Assert => "assert",
            StepKind::IfElse => "ifelse",
            StepKind::Match => "match",
            StepKind::Pairwise => "pairwise",
        };
        f.write_str(name)
    }
}
