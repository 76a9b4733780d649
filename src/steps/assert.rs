//! Assert step - unwrap optional values or fail

use crate::core::{Error, Outcome, Step};

/// Step returned by [`assert`]
#[derive(Debug, Clone)]
pub struct Assert<F> {
    throwable: F,
}

/// Create a step that turns `Option<T>` into `T`
///
/// `Some(value)` passes `value` on. `None` fails the step with whatever
/// `throwable` builds from the current context and global; recover the
/// original payload with [`anyhow::Error::downcast_ref`].
pub fn assert<C, G, E, F>(throwable: F) -> Assert<F>
where
    E: Into<Error>,
    F: Fn(&C, &G) -> E + Send + Sync + 'static,
{
    Assert { throwable }
}

impl<T, C, G, E, F> Step<Option<T>, C, G> for Assert<F>
where
    T: Send + 'static,
    E: Into<Error>,
    F: Fn(&C, &G) -> E + Send + Sync + 'static,
{
    type Output = T;

    fn call(&self, value: Option<T>, context: &C, global: &G) -> Outcome<T> {
        match value {
            Some(value) => Outcome::ok(value),
            None => Outcome::fail((self.throwable)(context, global)),
        }
    }
}
