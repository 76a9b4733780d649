//! Conditional branching steps

use crate::core::{Outcome, Step};
use std::sync::Arc;

/// Step returned by [`ifelse`] and [`when`]
#[derive(Debug)]
pub struct IfElse<P, A, B> {
    condition: P,
    branches: Arc<Branches<A, B>>,
}

impl<P: Clone, A, B> Clone for IfElse<P, A, B> {
    fn clone(&self) -> Self {
        Self {
            condition: self.condition.clone(),
            branches: self.branches.clone(),
        }
    }
}

#[derive(Debug)]
struct Branches<A, B> {
    then: A,
    otherwise: B,
}

impl<A, B> Branches<A, B> {
    fn dispatch<V, C, G, T>(&self, flag: bool, value: V, context: &C, global: &G) -> Outcome<T>
    where
        A: Fn(V, &C, &G) -> Outcome<T>,
        B: Fn(V, &C, &G) -> Outcome<T>,
    {
        if flag {
            (self.then)(value, context, global)
        } else {
            (self.otherwise)(value, context, global)
        }
    }
}

/// Create a step that runs `then` when `condition` holds and `otherwise` when it does not
///
/// The condition sees the value by reference; exactly one branch receives it
/// by move. A deferred condition makes the whole step deferred, with the
/// branch chosen after the condition settles. A failing condition fails the
/// step without running either branch.
pub fn ifelse<V, C, G, T, P, A, B>(condition: P, then: A, otherwise: B) -> IfElse<P, A, B>
where
    P: Fn(&V, &C, &G) -> Outcome<bool> + Send + Sync + 'static,
    A: Fn(V, &C, &G) -> Outcome<T> + Send + Sync + 'static,
    B: Fn(V, &C, &G) -> Outcome<T> + Send + Sync + 'static,
{
    IfElse {
        condition,
        branches: Arc::new(Branches { then, otherwise }),
    }
}

/// Step that returns its value unchanged
pub fn identity<V, C, G>(value: V, _context: &C, _global: &G) -> Outcome<V> {
    Outcome::ok(value)
}

/// Branch-only form of [`ifelse`]: values failing `condition` pass through untouched
pub fn when<V, C, G, P, A>(condition: P, then: A) -> IfElse<P, A, fn(V, &C, &G) -> Outcome<V>>
where
    V: 'static,
    C: 'static,
    G: 'static,
    P: Fn(&V, &C, &G) -> Outcome<bool> + Send + Sync + 'static,
    A: Fn(V, &C, &G) -> Outcome<V> + Send + Sync + 'static,
{
    ifelse(condition, then, identity::<V, C, G> as fn(V, &C, &G) -> Outcome<V>)
}

impl<V, C, G, T, P, A, B> Step<V, C, G> for IfElse<P, A, B>
where
    V: Send + 'static,
    C: Clone + Send + Sync + 'static,
    G: Clone + Send + Sync + 'static,
    T: Send + 'static,
    P: Fn(&V, &C, &G) -> Outcome<bool> + Send + Sync + 'static,
    A: Fn(V, &C, &G) -> Outcome<T> + Send + Sync + 'static,
    B: Fn(V, &C, &G) -> Outcome<T> + Send + Sync + 'static,
{
    type Output = T;

    fn call(&self, value: V, context: &C, global: &G) -> Outcome<T> {
        match (self.condition)(&value, context, global) {
            Outcome::Ready(Ok(flag)) => self.branches.dispatch(flag, value, context, global),
            Outcome::Ready(Err(error)) => Outcome::Ready(Err(error)),
            Outcome::Deferred(pending) => {
                let branches = self.branches.clone();
                let context = context.clone();
                let global = global.clone();
                Outcome::deferred(async move {
                    let flag = pending.await?;
                    branches.dispatch(flag, value, &context, &global).await
                })
            }
        }
    }
}
