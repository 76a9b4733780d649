//! Reusable step factories
//!
//! Each factory returns a value implementing [`crate::Step`], so it can be
//! registered on a pipeline with `step` or called directly. The pipeline
//! builder exposes the same factories as convenience registrations.

pub mod assert;
pub mod ifelse;
pub mod matcher;
pub mod pairwise;
pub mod tap;

pub use assert::{assert, Assert};
pub use ifelse::{identity, ifelse, when, IfElse};
pub use matcher::{match_with, Match, Matcher};
pub use pairwise::{pairwise, Pairwise};
pub use tap::{tap, Tap};
