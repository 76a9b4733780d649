//! Pairwise step - keep the value and add a derived one

use crate::core::{Outcome, Step};

/// Step returned by [`pairwise`]
#[derive(Debug, Clone)]
pub struct Pairwise<F> {
    derive: F,
}

/// Create a step producing `(value, derive(&value))`
///
/// When `derive` is deferred, the pair is built once it settles.
pub fn pairwise<V, C, G, N, F>(derive: F) -> Pairwise<F>
where
    F: Fn(&V, &C, &G) -> Outcome<N> + Send + Sync + 'static,
{
    Pairwise { derive }
}

impl<V, C, G, N, F> Step<V, C, G> for Pairwise<F>
where
    V: Send + 'static,
    N: Send + 'static,
    F: Fn(&V, &C, &G) -> Outcome<N> + Send + Sync + 'static,
{
    type Output = (V, N);

    fn call(&self, value: V, context: &C, global: &G) -> Outcome<(V, N)> {
        let derived = (self.derive)(&value, context, global);
        derived.map(move |derived| (value, derived))
    }
}
