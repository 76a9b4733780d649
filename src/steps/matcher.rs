//! Multi-way matching
//!
//! A [`Match`] collects `(condition, handler)` arms in registration order plus
//! an optional fallback, and composes them into a [`Matcher`] step. The first
//! arm whose condition holds handles the value; later arms are never
//! evaluated.
//!
//! Conditions must answer synchronously. A deferred condition fails the
//! match with [`MatchError::DeferredCondition`] before any later arm runs.

use crate::core::{MatchError, Outcome, Step};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

type Condition<V, C, G> = Arc<dyn Fn(&V, &C, &G) -> Outcome<bool> + Send + Sync>;
type Handler<V, C, G, T> = Arc<dyn Fn(V, &C, &G) -> Outcome<T> + Send + Sync>;

struct Arm<V, C, G, T> {
    condition: Condition<V, C, G>,
    handler: Handler<V, C, G, T>,
}

impl<V, C, G, T> Clone for Arm<V, C, G, T> {
    fn clone(&self) -> Self {
        Self {
            condition: self.condition.clone(),
            handler: self.handler.clone(),
        }
    }
}

/// Builder for a multi-way match over values of type `V` producing `T`
pub struct Match<V, C, G, T> {
    arms: Vec<Arm<V, C, G, T>>,
    fallback: Option<Handler<V, C, G, T>>,
}

impl<V, C, G, T> Clone for Match<V, C, G, T> {
    fn clone(&self) -> Self {
        Self {
            arms: self.arms.clone(),
            fallback: self.fallback.clone(),
        }
    }
}

impl<V, C, G, T> Default for Match<V, C, G, T> {
    fn default() -> Self {
        Self {
            arms: Vec::new(),
            fallback: None,
        }
    }
}

impl<V, C, G, T> fmt::Debug for Match<V, C, G, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Match")
            .field("arms", &self.arms.len())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

impl<V, C, G, T> Match<V, C, G, T>
where
    V: Send + 'static,
    C: Send + Sync + 'static,
    G: Send + Sync + 'static,
    T: Send + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an arm
    pub fn on<P, H>(mut self, condition: P, handler: H) -> Self
    where
        P: Fn(&V, &C, &G) -> Outcome<bool> + Send + Sync + 'static,
        H: Fn(V, &C, &G) -> Outcome<T> + Send + Sync + 'static,
    {
        self.arms.push(Arm {
            condition: Arc::new(condition),
            handler: Arc::new(handler),
        });
        self
    }

    /// Set the handler used when no arm matches, replacing any earlier one
    pub fn otherwise<H>(mut self, handler: H) -> Self
    where
        H: Fn(V, &C, &G) -> Outcome<T> + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(handler));
        self
    }

    /// Number of registered arms, not counting the fallback
    pub fn len(&self) -> usize {
        self.arms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arms.is_empty()
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Freeze the current arms into a reusable step
    ///
    /// Arms added to this builder afterwards do not affect the returned matcher.
    pub fn compose(&self) -> Matcher<V, C, G, T> {
        Matcher {
            inner: Arc::new(self.clone()),
        }
    }

    /// Compose and evaluate once
    pub fn run(&self, value: V, context: &C, global: &G) -> Outcome<T> {
        self.evaluate(value, context, global)
    }

    fn evaluate(&self, value: V, context: &C, global: &G) -> Outcome<T> {
        for (index, arm) in self.arms.iter().enumerate() {
            match (arm.condition)(&value, context, global) {
                Outcome::Ready(Ok(true)) => {
                    trace!("Match arm {} selected", index);
                    return (arm.handler)(value, context, global);
                }
                Outcome::Ready(Ok(false)) => {}
                Outcome::Ready(Err(error)) => return Outcome::Ready(Err(error)),
                Outcome::Deferred(_) => {
                    trace!("Match arm {} returned a deferred condition", index);
                    return Outcome::fail(MatchError::DeferredCondition { index });
                }
            }
        }

        match &self.fallback {
            Some(fallback) => {
                trace!("No match arm selected, using fallback");
                fallback(value, context, global)
            }
            None => {
                trace!("No match arm selected and no fallback");
                Outcome::fail(MatchError::Unmatched)
            }
        }
    }
}

/// Composed match, usable as a step
pub struct Matcher<V, C, G, T> {
    inner: Arc<Match<V, C, G, T>>,
}

impl<V, C, G, T> Clone for Matcher<V, C, G, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<V, C, G, T> fmt::Debug for Matcher<V, C, G, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Matcher").field(&self.inner).finish()
    }
}

impl<V, C, G, T> Matcher<V, C, G, T>
where
    V: Send + 'static,
    C: Send + Sync + 'static,
    G: Send + Sync + 'static,
    T: Send + 'static,
{
    pub fn call(&self, value: V, context: &C, global: &G) -> Outcome<T> {
        self.inner.evaluate(value, context, global)
    }
}

impl<V, C, G, T> Step<V, C, G> for Matcher<V, C, G, T>
where
    V: Send + 'static,
    C: Send + Sync + 'static,
    G: Send + Sync + 'static,
    T: Send + 'static,
{
    type Output = T;

    fn call(&self, value: V, context: &C, global: &G) -> Outcome<T> {
        self.inner.evaluate(value, context, global)
    }
}

/// Build a matcher in one expression
///
/// ```rust
/// use typepipe::{steps::match_with, Outcome};
///
/// let sign = match_with(|m| {
///     m.on(|v: &i32, _: &(), _: &()| Outcome::ok(*v < 0), |_, _, _| Outcome::ok("negative"))
///         .on(|v, _, _| Outcome::ok(*v == 0), |_, _, _| Outcome::ok("zero"))
///         .otherwise(|_, _, _| Outcome::ok("positive"))
/// });
///
/// assert_eq!(sign.call(-3, &(), &()).expect_ready("sync").unwrap(), "negative");
/// assert_eq!(sign.call(9, &(), &()).expect_ready("sync").unwrap(), "positive");
/// ```
pub fn match_with<V, C, G, T, F>(build: F) -> Matcher<V, C, G, T>
where
    V: Send + 'static,
    C: Send + Sync + 'static,
    G: Send + Sync + 'static,
    T: Send + 'static,
    F: FnOnce(Match<V, C, G, T>) -> Match<V, C, G, T>,
{
    build(Match::new()).compose()
}
