//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{ChatCommand, ValidateCommand};
use std::ffi::OsString;

/// Demo chat bot dispatching messages through typed pipelines
#[derive(Debug, Parser, Clone)]
#[command(name = "typepipe")]
#[command(version = "0.1.0")]
#[command(about = "Dispatch chat messages through a YAML-configured pipeline bot", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Send messages to a bot and print its replies
    Chat(ChatCommand),

    /// Validate a bot configuration
    Validate(ValidateCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
