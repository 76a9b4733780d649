//! Main execution engine - runs a composed pipeline

use crate::core::{Outcome, Step};
use crate::execution::executor::Runner;
use std::fmt;
use std::sync::Arc;
use tracing::{debug_span, Instrument};

/// A composed pipeline, callable any number of times
///
/// Produced by [`crate::Pipeline::compose`]. Cloning is cheap and clones
/// share the same step chain. Each call starts from a fresh frame, so calls
/// are independent even when they overlap.
pub struct Composed<In, C, G, Out> {
    name: Arc<str>,
    runner: Runner<In, C, G, Out>,
}

impl<In, C, G, Out> Clone for Composed<In, C, G, Out> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            runner: self.runner.clone(),
        }
    }
}

impl<In, C, G, Out> fmt::Debug for Composed<In, C, G, Out> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Composed").field("name", &self.name).finish_non_exhaustive()
    }
}

impl<In, C, G, Out> Composed<In, C, G, Out>
where
    In: Send + 'static,
    C: Clone + Send + Sync + 'static,
    G: Clone + Send + Sync + 'static,
    Out: Send + 'static,
{
    pub(crate) fn new(name: &str, runner: Runner<In, C, G, Out>) -> Self {
        Self {
            name: Arc::from(name),
            runner,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the pipeline on `value`
    ///
    /// The result stays ready for as long as every step answers
    /// synchronously; the first deferred step makes it deferred.
    pub fn call(&self, value: In, context: &C, global: &G) -> Outcome<Out> {
        let span = debug_span!("pipeline", name = %self.name);
        let outcome = {
            let _entered = span.enter();
            (self.runner)(value, context.clone(), global.clone())
        };

        match outcome {
            Outcome::Deferred(future) => Outcome::Deferred(Box::pin(future.instrument(span))),
            ready => ready,
        }
    }
}

impl<In, C, G, Out> Step<In, C, G> for Composed<In, C, G, Out>
where
    In: Send + 'static,
    C: Clone + Send + Sync + 'static,
    G: Clone + Send + Sync + 'static,
    Out: Send + 'static,
{
    type Output = Out;

    fn call(&self, value: In, context: &C, global: &G) -> Outcome<Out> {
        Composed::call(self, value, context, global)
    }
}
