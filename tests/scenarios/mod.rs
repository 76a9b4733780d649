//! Scenario-based tests for typepipe

mod failure_handling;
mod success_chain;
