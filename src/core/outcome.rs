//! Ready-or-deferred step results

use crate::core::error::Error;
use std::fmt;
use std::future::{Future, IntoFuture};
use std::pin::Pin;

/// Type alias for boxed futures carried by deferred outcomes.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The result of invoking a step
///
/// A step either finishes on the spot (`Ready`) or hands back work that
/// completes later (`Deferred`). The combinators below keep ready values on
/// the synchronous path and only build a continuation once something is
/// actually deferred, so an all-synchronous pipeline never allocates a future.
#[must_use = "an outcome does nothing unless it is inspected or awaited"]
pub enum Outcome<T, E = Error> {
    /// The step already finished
    Ready(Result<T, E>),
    /// The step finishes when the future resolves
    Deferred(BoxFuture<'static, Result<T, E>>),
}

/// Check whether an outcome is deferred
pub fn is_deferred<T, E>(outcome: &Outcome<T, E>) -> bool {
    outcome.is_deferred()
}

impl<T, E> Outcome<T, E> {
    /// A ready success
    pub fn ok(value: T) -> Self {
        Outcome::Ready(Ok(value))
    }

    /// A ready failure
    pub fn fail(error: impl Into<E>) -> Self {
        Outcome::Ready(Err(error.into()))
    }

    /// Wrap a future as a deferred outcome
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        Outcome::Deferred(Box::pin(future))
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Outcome::Deferred(_))
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Outcome::Ready(_))
    }

    /// Take the result if it is already available, handing the outcome back otherwise
    pub fn try_ready(self) -> Result<Result<T, E>, Self> {
        match self {
            Outcome::Ready(result) => Ok(result),
            deferred => Err(deferred),
        }
    }

    /// Take the result of an outcome known to be ready
    ///
    /// # Panics
    ///
    /// Panics with `msg` if the outcome is deferred.
    pub fn expect_ready(self, msg: &str) -> Result<T, E> {
        match self {
            Outcome::Ready(result) => result,
            Outcome::Deferred(_) => panic!("{}", msg),
        }
    }
}

impl<T, E> Outcome<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Continue with the settled result
    ///
    /// Ready outcomes call `next` immediately; deferred outcomes call it once
    /// the future resolves and await whatever it returns.
    pub fn resolve_with<U, F, Next>(self, next: Next) -> Outcome<U, F>
    where
        U: Send + 'static,
        F: Send + 'static,
        Next: FnOnce(Result<T, E>) -> Outcome<U, F> + Send + 'static,
    {
        match self {
            Outcome::Ready(result) => next(result),
            Outcome::Deferred(future) => {
                Outcome::Deferred(Box::pin(async move { next(future.await).await }))
            }
        }
    }

    /// Transform the settled result without changing synchronicity
    pub fn map_result<U, F, Op>(self, op: Op) -> Outcome<U, F>
    where
        U: Send + 'static,
        F: Send + 'static,
        Op: FnOnce(Result<T, E>) -> Result<U, F> + Send + 'static,
    {
        match self {
            Outcome::Ready(result) => Outcome::Ready(op(result)),
            Outcome::Deferred(future) => {
                Outcome::Deferred(Box::pin(async move { op(future.await) }))
            }
        }
    }

    pub fn map<U, Op>(self, op: Op) -> Outcome<U, E>
    where
        U: Send + 'static,
        Op: FnOnce(T) -> U + Send + 'static,
    {
        self.map_result(move |result| result.map(op))
    }

    pub fn map_err<F, Op>(self, op: Op) -> Outcome<T, F>
    where
        F: Send + 'static,
        Op: FnOnce(E) -> F + Send + 'static,
    {
        self.map_result(move |result| result.map_err(op))
    }

    /// Chain another outcome-producing operation on success
    pub fn and_then<U, Op>(self, op: Op) -> Outcome<U, E>
    where
        U: Send + 'static,
        Op: FnOnce(T) -> Outcome<U, E> + Send + 'static,
    {
        self.resolve_with(move |result| match result {
            Ok(value) => op(value),
            Err(error) => Outcome::Ready(Err(error)),
        })
    }

    /// Recover from a failure with another outcome-producing operation
    pub fn or_else<F, Op>(self, op: Op) -> Outcome<T, F>
    where
        F: Send + 'static,
        Op: FnOnce(E) -> Outcome<T, F> + Send + 'static,
    {
        self.resolve_with(move |result| match result {
            Ok(value) => Outcome::Ready(Ok(value)),
            Err(error) => op(error),
        })
    }
}

impl<T, E> IntoFuture for Outcome<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    type Output = Result<T, E>;
    type IntoFuture = BoxFuture<'static, Result<T, E>>;

    fn into_future(self) -> Self::IntoFuture {
        match self {
            Outcome::Ready(result) => Box::pin(std::future::ready(result)),
            Outcome::Deferred(future) => future,
        }
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        Outcome::Ready(result)
    }
}

impl<T: fmt::Debug, E: fmt::Debug> fmt::Debug for Outcome<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Ready(result) => f.debug_tuple("Ready").field(result).finish(),
            Outcome::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}
