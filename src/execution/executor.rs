//! Step executor - links registered steps into a single callable chain
//!
//! Every registration on a [`crate::Pipeline`] wraps the chain built so far
//! in one more link. A link receives the [`Frame`] left by the previous one
//! and produces the next, or a [`Fault`] that skips every remaining link.
//! The active error handler lives in the frame, so each invocation starts
//! without one and concurrent invocations never see each other's handlers.

use crate::core::{Error, Outcome, Step};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{debug, trace};

/// Error handler installed by `catch`, bound to the context it was registered under
pub(crate) type Handler<R> = Arc<dyn Fn(Error) -> Outcome<R> + Send + Sync>;

/// Chain of links from the pipeline input to the current frame
pub(crate) type Chain<In, C0, G, V, C, R> =
    Arc<dyn Fn(In, C0, G) -> Outcome<Frame<V, C, G, R>, Fault<R>> + Send + Sync>;

/// Fully settled chain, ready to be wrapped by [`super::Composed`]
pub(crate) type Runner<In, C0, G, T> = Arc<dyn Fn(In, C0, G) -> Outcome<T> + Send + Sync>;

/// State carried between links during one invocation
pub(crate) struct Frame<V, C, G, R> {
    pub value: V,
    pub context: C,
    pub global: G,
    pub handler: Option<Handler<R>>,
}

/// A failed step together with the handler that was active when it failed
pub(crate) struct Fault<R> {
    pub error: Error,
    pub handler: Option<Handler<R>>,
}

/// Turn a step result into the next frame, or a fault keeping the active handler
fn advance<V, C, G, R>(
    value: Result<V, Error>,
    context: C,
    global: G,
    handler: Option<Handler<R>>,
) -> Result<Frame<V, C, G, R>, Fault<R>> {
    match value {
        Ok(value) => Ok(Frame {
            value,
            context,
            global,
            handler,
        }),
        Err(error) => Err(Fault { error, handler }),
    }
}

/// Empty chain: hands the input through with no handler installed
pub(crate) fn origin<In, C0, G, R>() -> Chain<In, C0, G, In, C0, R>
where
    In: Send + 'static,
    C0: Send + Sync + 'static,
    G: Send + Sync + 'static,
    R: Send + 'static,
{
    Arc::new(|value, context, global| {
        Outcome::ok(Frame {
            value,
            context,
            global,
            handler: None,
        })
    })
}

/// Append a step that transforms the value
pub(crate) fn then_step<In, C0, G, V, C, R, S>(
    chain: Chain<In, C0, G, V, C, R>,
    step: S,
) -> Chain<In, C0, G, S::Output, C, R>
where
    In: 'static,
    C0: 'static,
    V: Send + 'static,
    C: Send + Sync + 'static,
    G: Send + Sync + 'static,
    R: Send + 'static,
    S: Step<V, C, G>,
{
    let step = Arc::new(step);
    Arc::new(move |value, context, global| {
        let step = step.clone();
        chain(value, context, global).and_then(move |frame| {
            let Frame {
                value,
                context,
                global,
                handler,
            } = frame;
            let outcome = step.call(value, &context, &global);
            outcome.map_result(move |value| advance(value, context, global, handler))
        })
    })
}

/// Append a context replacement; the value passes through unchanged
pub(crate) fn then_context<In, C0, G, V, C, C2, R, F>(
    chain: Chain<In, C0, G, V, C, R>,
    replace: F,
) -> Chain<In, C0, G, V, C2, R>
where
    In: 'static,
    C0: 'static,
    V: Send + 'static,
    C: Send + Sync + 'static,
    C2: Send + Sync + 'static,
    G: Send + Sync + 'static,
    R: Send + 'static,
    F: Fn(&V, &C, &G) -> Outcome<C2> + Send + Sync + 'static,
{
    let replace = Arc::new(replace);
    Arc::new(move |value, context, global| {
        let replace = replace.clone();
        chain(value, context, global).and_then(move |frame| {
            let Frame {
                value,
                context,
                global,
                handler,
            } = frame;
            let pending = replace(&value, &context, &global);
            drop(context);
            pending.map_result(move |context| match context {
                Ok(context) => advance(Ok(value), context, global, handler),
                Err(error) => Err(Fault { error, handler }),
            })
        })
    })
}

/// Append a handler installation; later failures in the same invocation go to `handler`
pub(crate) fn then_catch<In, C0, G, V, C, R, H>(
    chain: Chain<In, C0, G, V, C, R>,
    handler: H,
) -> Chain<In, C0, G, V, C, R>
where
    In: 'static,
    C0: 'static,
    V: Send + 'static,
    C: Clone + Send + Sync + 'static,
    G: Clone + Send + Sync + 'static,
    R: Send + 'static,
    H: Fn(Error, &C, &G) -> Outcome<R> + Send + Sync + 'static,
{
    let handler = Arc::new(handler);
    Arc::new(move |value, context, global| {
        let handler = handler.clone();
        chain(value, context, global).map(move |mut frame| {
            trace!("Installing error handler");
            let context = frame.context.clone();
            let global = frame.global.clone();
            frame.handler = Some(Arc::new(move |error| handler(error, &context, &global)));
            frame
        })
    })
}

/// Re-type a chain that cannot have a handler yet so that one can be installed
pub(crate) fn widen<In, C0, G, V, C, R>(
    chain: Chain<In, C0, G, V, C, Infallible>,
) -> Chain<In, C0, G, V, C, R>
where
    In: 'static,
    C0: 'static,
    V: Send + 'static,
    C: Send + Sync + 'static,
    G: Send + Sync + 'static,
    R: Send + 'static,
{
    Arc::new(move |value, context, global| {
        chain(value, context, global).map_result(|result| match result {
            Ok(frame) => Ok(Frame {
                value: frame.value,
                context: frame.context,
                global: frame.global,
                handler: frame.handler.map(unreachable_handler),
            }),
            Err(fault) => Err(Fault {
                error: fault.error,
                handler: fault.handler.map(unreachable_handler),
            }),
        })
    })
}

fn unreachable_handler<R: Send + 'static>(handler: Handler<Infallible>) -> Handler<R> {
    Arc::new(move |error| handler(error).map(|never| match never {}))
}

/// Close the chain: successes go through `completed`, recovered faults through `recovered`
///
/// A fault with a handler is replaced by the handler's outcome, which may
/// itself be deferred or fail. A fault without one surfaces its error
/// unchanged.
pub(crate) fn settle<In, C0, G, V, C, R, T>(
    chain: Chain<In, C0, G, V, C, R>,
    completed: fn(V) -> T,
    recovered: fn(R) -> T,
) -> Runner<In, C0, G, T>
where
    In: 'static,
    C0: 'static,
    V: Send + 'static,
    C: Send + Sync + 'static,
    G: Send + Sync + 'static,
    R: Send + 'static,
    T: Send + 'static,
{
    Arc::new(move |value, context, global| {
        chain(value, context, global).resolve_with(move |result| match result {
            Ok(frame) => Outcome::ok(completed(frame.value)),
            Err(Fault {
                error,
                handler: Some(handler),
            }) => {
                debug!("Step failed, passing error to installed handler: {}", error);
                handler(error).map(recovered)
            }
            Err(Fault { error, handler: None }) => {
                debug!("Step failed with no handler installed: {}", error);
                Outcome::Ready(Err(error))
            }
        })
    })
}
