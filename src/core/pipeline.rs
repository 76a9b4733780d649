//! Pipeline builder
//!
//! A [`Pipeline`] threads three things through its steps: the current value,
//! a context that steps may replace, and a global shared by the whole run.
//! Every registration consumes the builder and returns a new one typed after
//! the step just added, so a step can only be registered where its input
//! type matches the previous step's output.
//!
//! ```rust
//! use typepipe::{Outcome, Pipeline};
//!
//! let pipeline = Pipeline::<i32, (), ()>::new()
//!     .pipe(|value, _, _| Outcome::ok(value + 1))
//!     .pipe(|value, _, _| Outcome::ok(value * 10))
//!     .tap(|value, _, _| {
//!         println!("result: {value}");
//!         Outcome::ok(())
//!     });
//!
//! let result = pipeline.run(1, &(), &()).expect_ready("all steps are synchronous");
//! assert_eq!(result.unwrap(), 20);
//! ```

use crate::core::{Error, Outcome, PipelineError, Step, StepKind};
use crate::execution::executor::{origin, settle, then_catch, then_context, then_step, widen, Chain};
use crate::execution::Composed;
use crate::steps::{self, Match};
use std::convert::Infallible;
use std::fmt;
use std::marker::PhantomData;
use tracing::debug;

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Uncaught {}
    impl<R> Sealed for super::Caught<R> {}
}

/// Whether a pipeline has an error handler registered, and what it recovers into
pub trait CatchState: sealed::Sealed {
    /// Value produced by the registered handlers
    type Recovery: Send + 'static;

    /// Result type of a composed pipeline whose last step produces `V`
    type Output<V: Send + 'static>: Send + 'static;

    fn completed<V: Send + 'static>(value: V) -> Self::Output<V>;

    fn recovered<V: Send + 'static>(recovery: Self::Recovery) -> Self::Output<V>;
}

/// No `catch` registered yet: failures always propagate
#[derive(Debug, Clone, Copy, Default)]
pub struct Uncaught;

/// At least one `catch` registered, recovering into `R`
pub struct Caught<R>(PhantomData<fn() -> R>);

impl<R> fmt::Debug for Caught<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Caught")
    }
}

impl CatchState for Uncaught {
    type Recovery = Infallible;
    type Output<V: Send + 'static> = V;

    fn completed<V: Send + 'static>(value: V) -> V {
        value
    }

    fn recovered<V: Send + 'static>(recovery: Infallible) -> V {
        match recovery {}
    }
}

impl<R: Send + 'static> CatchState for Caught<R> {
    type Recovery = R;
    type Output<V: Send + 'static> = Settled<V, R>;

    fn completed<V: Send + 'static>(value: V) -> Settled<V, R> {
        Settled::Completed(value)
    }

    fn recovered<V: Send + 'static>(recovery: R) -> Settled<V, R> {
        Settled::Recovered(recovery)
    }
}

/// Result of a pipeline with a `catch` registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Settled<T, R> {
    /// Every step succeeded
    Completed(T),
    /// A step failed and the handler active at that point recovered
    Recovered(R),
}

impl<T, R> Settled<T, R> {
    pub fn is_completed(&self) -> bool {
        matches!(self, Settled::Completed(_))
    }

    pub fn is_recovered(&self) -> bool {
        matches!(self, Settled::Recovered(_))
    }

    pub fn completed(self) -> Option<T> {
        match self {
            Settled::Completed(value) => Some(value),
            Settled::Recovered(_) => None,
        }
    }

    pub fn recovered(self) -> Option<R> {
        match self {
            Settled::Completed(_) => None,
            Settled::Recovered(recovery) => Some(recovery),
        }
    }
}

impl<T> Settled<T, T> {
    /// Collapse a pipeline whose handler recovers into the same type it completes with
    pub fn into_inner(self) -> T {
        match self {
            Settled::Completed(value) | Settled::Recovered(value) => value,
        }
    }
}

/// Typed pipeline builder
///
/// - `In`, `C0`, `G`: input value, initial context and global
/// - `Out`, `C`: value and context after the last registered step
/// - `H`: [`Uncaught`] or [`Caught`], tracking registered error handlers
pub struct Pipeline<In, C0, G, Out = In, C = C0, H = Uncaught>
where
    H: CatchState,
{
    name: String,
    steps: Vec<StepKind>,
    chain: Chain<In, C0, G, Out, C, H::Recovery>,
    _state: PhantomData<fn() -> H>,
}

impl<In, C0, G> Pipeline<In, C0, G>
where
    In: Send + 'static,
    C0: Clone + Send + Sync + 'static,
    G: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            name: "pipeline".to_string(),
            steps: Vec::new(),
            chain: origin(),
            _state: PhantomData,
        }
    }
}

impl<In, C0, G> Default for Pipeline<In, C0, G>
where
    In: Send + 'static,
    C0: Clone + Send + Sync + 'static,
    G: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<In, C0, G, Out, C, H: CatchState> Clone for Pipeline<In, C0, G, Out, C, H> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            steps: self.steps.clone(),
            chain: self.chain.clone(),
            _state: PhantomData,
        }
    }
}

impl<In, C0, G, Out, C, H: CatchState> fmt::Debug for Pipeline<In, C0, G, Out, C, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("steps", &self.steps)
            .finish_non_exhaustive()
    }
}

impl<In, C0, G, Out, C, H> Pipeline<In, C0, G, Out, C, H>
where
    In: Send + 'static,
    C0: Clone + Send + Sync + 'static,
    G: Clone + Send + Sync + 'static,
    Out: Send + 'static,
    C: Clone + Send + Sync + 'static,
    H: CatchState,
{
    fn append<Next, C2>(
        self,
        kind: StepKind,
        link: impl FnOnce(Chain<In, C0, G, Out, C, H::Recovery>) -> Chain<In, C0, G, Next, C2, H::Recovery>,
    ) -> Pipeline<In, C0, G, Next, C2, H> {
        let Pipeline {
            name,
            mut steps,
            chain,
            ..
        } = self;
        steps.push(kind);

        Pipeline {
            name,
            steps,
            chain: link(chain),
            _state: PhantomData,
        }
    }

    /// Label used for this pipeline's tracing span
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registered steps, one entry per registration
    pub fn steps(&self) -> &[StepKind] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Register a step function
    pub fn pipe<F, Next>(self, f: F) -> Pipeline<In, C0, G, Next, C, H>
    where
        F: Fn(Out, &C, &G) -> Outcome<Next> + Send + Sync + 'static,
        Next: Send + 'static,
    {
        self.append(StepKind::Pipe, |chain| then_step(chain, f))
    }

    /// Register any [`Step`], such as a composed pipeline or matcher
    pub fn step<S>(self, step: S) -> Pipeline<In, C0, G, S::Output, C, H>
    where
        S: Step<Out, C, G>,
    {
        self.append(StepKind::Pipe, |chain| then_step(chain, step))
    }

    /// Replace the context seen by later steps
    ///
    /// `f` sees the current value and context; the value passes through
    /// unchanged. A deferred context is awaited before the next step runs.
    pub fn context<F, C2>(self, f: F) -> Pipeline<In, C0, G, Out, C2, H>
    where
        F: Fn(&Out, &C, &G) -> Outcome<C2> + Send + Sync + 'static,
        C2: Clone + Send + Sync + 'static,
    {
        self.append(StepKind::Context, |chain| then_context(chain, f))
    }

    /// See [`steps::tap`]
    pub fn tap<F, R>(self, f: F) -> Self
    where
        F: Fn(&Out, &C, &G) -> Outcome<R> + Send + Sync + 'static,
        R: Send + 'static,
    {
        self.append(StepKind::Tap, |chain| then_step(chain, steps::tap(f)))
    }

    /// See [`steps::ifelse`]
    pub fn ifelse<P, A, B, T>(self, condition: P, then: A, otherwise: B) -> Pipeline<In, C0, G, T, C, H>
    where
        P: Fn(&Out, &C, &G) -> Outcome<bool> + Send + Sync + 'static,
        A: Fn(Out, &C, &G) -> Outcome<T> + Send + Sync + 'static,
        B: Fn(Out, &C, &G) -> Outcome<T> + Send + Sync + 'static,
        T: Send + 'static,
    {
        let step = steps::ifelse(condition, then, otherwise);
        self.append(StepKind::IfElse, |chain| then_step(chain, step))
    }

    /// See [`steps::when`]
    pub fn when<P, A>(self, condition: P, then: A) -> Self
    where
        P: Fn(&Out, &C, &G) -> Outcome<bool> + Send + Sync + 'static,
        A: Fn(Out, &C, &G) -> Outcome<Out> + Send + Sync + 'static,
    {
        let step = steps::when(condition, then);
        self.append(StepKind::IfElse, |chain| then_step(chain, step))
    }

    /// Register a multi-way match built by `build`
    pub fn match_with<T, F>(self, build: F) -> Pipeline<In, C0, G, T, C, H>
    where
        F: FnOnce(Match<Out, C, G, T>) -> Match<Out, C, G, T>,
        T: Send + 'static,
    {
        let matcher = steps::match_with(build);
        self.append(StepKind::Match, |chain| then_step(chain, matcher))
    }

    /// See [`steps::pairwise`]
    pub fn pairwise<F, N>(self, f: F) -> Pipeline<In, C0, G, (Out, N), C, H>
    where
        F: Fn(&Out, &C, &G) -> Outcome<N> + Send + Sync + 'static,
        N: Send + 'static,
    {
        self.append(StepKind::Pairwise, |chain| then_step(chain, steps::pairwise(f)))
    }

    /// Build a reusable callable from the registered steps
    ///
    /// Fails with [`PipelineError::Empty`] when nothing was registered.
    pub fn compose(&self) -> Result<Composed<In, C0, G, H::Output<Out>>, PipelineError> {
        if self.steps.is_empty() {
            return Err(PipelineError::Empty);
        }

        debug!("Composing pipeline {} with {} steps", self.name, self.steps.len());
        let runner = settle(self.chain.clone(), H::completed::<Out>, H::recovered::<Out>);
        Ok(Composed::new(&self.name, runner))
    }

    /// Compose and invoke once
    pub fn run(&self, value: In, context: &C0, global: &G) -> Outcome<H::Output<Out>> {
        match self.compose() {
            Ok(composed) => composed.call(value, context, global),
            Err(error) => Outcome::fail(error),
        }
    }
}

impl<In, C0, G, T, C, H> Pipeline<In, C0, G, Option<T>, C, H>
where
    In: Send + 'static,
    C0: Clone + Send + Sync + 'static,
    G: Clone + Send + Sync + 'static,
    T: Send + 'static,
    C: Clone + Send + Sync + 'static,
    H: CatchState,
{
    /// See [`steps::assert`]
    pub fn assert<F, E>(self, throwable: F) -> Pipeline<In, C0, G, T, C, H>
    where
        F: Fn(&C, &G) -> E + Send + Sync + 'static,
        E: Into<Error>,
    {
        self.append(StepKind::Assert, |chain| then_step(chain, steps::assert(throwable)))
    }
}

impl<In, C0, G, Out, C> Pipeline<In, C0, G, Out, C, Uncaught>
where
    In: Send + 'static,
    C0: Clone + Send + Sync + 'static,
    G: Clone + Send + Sync + 'static,
    Out: Send + 'static,
    C: Clone + Send + Sync + 'static,
{
    /// Handle failures of every step registered after this point
    ///
    /// The handler receives the error together with the context and global
    /// in effect here. Its result, possibly deferred, becomes
    /// [`Settled::Recovered`]; if it fails, that failure propagates instead.
    pub fn catch<F, R>(self, handler: F) -> Pipeline<In, C0, G, Out, C, Caught<R>>
    where
        F: Fn(Error, &C, &G) -> Outcome<R> + Send + Sync + 'static,
        R: Send + 'static,
    {
        let Pipeline {
            name,
            mut steps,
            chain,
            ..
        } = self;
        steps.push(StepKind::Catch);

        Pipeline {
            name,
            steps,
            chain: then_catch(widen(chain), handler),
            _state: PhantomData,
        }
    }
}

impl<In, C0, G, Out, C, R> Pipeline<In, C0, G, Out, C, Caught<R>>
where
    In: Send + 'static,
    C0: Clone + Send + Sync + 'static,
    G: Clone + Send + Sync + 'static,
    Out: Send + 'static,
    C: Clone + Send + Sync + 'static,
    R: Send + 'static,
{
    /// Replace the active handler for every step registered after this point
    pub fn catch<F>(self, handler: F) -> Self
    where
        F: Fn(Error, &C, &G) -> Outcome<R> + Send + Sync + 'static,
    {
        self.append(StepKind::Catch, |chain| then_catch(chain, handler))
    }
}
