//! Tap step - run a side effect and keep the value

use crate::core::{Outcome, Step};

/// Step returned by [`tap`]
#[derive(Debug, Clone)]
pub struct Tap<F> {
    effect: F,
}

/// Create a step that calls `effect` and passes the value it received on unchanged
///
/// Whatever `effect` succeeds with is discarded. If it fails, the failure
/// propagates, which makes `tap` the usual way to short-circuit a pipeline
/// from a guard. A deferred `effect` makes the step deferred: the value is
/// handed on once the effect settles.
///
/// # Example
///
/// ```rust
/// use typepipe::{steps::tap, Outcome, Step};
///
/// let log = tap(|value: &i32, _: &(), _: &()| {
///     println!("saw {value}");
///     Outcome::ok(())
/// });
///
/// assert_eq!(log.call(1, &(), &()).expect_ready("sync").unwrap(), 1);
/// ```
pub fn tap<V, C, G, R, F>(effect: F) -> Tap<F>
where
    F: Fn(&V, &C, &G) -> Outcome<R> + Send + Sync + 'static,
{
    Tap { effect }
}

impl<V, C, G, R, F> Step<V, C, G> for Tap<F>
where
    V: Send + 'static,
    R: Send + 'static,
    F: Fn(&V, &C, &G) -> Outcome<R> + Send + Sync + 'static,
{
    type Output = V;

    fn call(&self, value: V, context: &C, global: &G) -> Outcome<V> {
        let effect = (self.effect)(&value, context, global);
        effect.map(move |_| value)
    }
}
