//! Command chat bot built on pipelines
//!
//! A small end-to-end user of the library: each incoming message runs
//! through a [`bot::BotPipeline`] configured from YAML.

pub mod bot;
pub mod command;
pub mod config;
pub mod response;
pub mod sink;

pub use bot::{build_pipeline, BotGlobal, BotPipeline, ChatBot, Dispatch};
pub use command::{Command, Envelope, Invocation, Trigger};
pub use config::{BotConfig, CommandAction, CommandConfig};
pub use response::{ChatError, Reply, Skipped};
pub use sink::{ChatSink, ConsoleSink, MemorySink};
