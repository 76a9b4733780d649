//! Pipeline execution engine

pub mod engine;
pub(crate) mod executor;

pub use engine::Composed;
