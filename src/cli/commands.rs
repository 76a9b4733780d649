//! CLI command definitions

use clap::Args;

/// Send messages to a bot
#[derive(Debug, Args, Clone)]
pub struct ChatCommand {
    /// Path to bot YAML file
    #[arg(short, long)]
    pub config: String,

    /// User the messages are sent as
    #[arg(short, long, default_value = "viewer")]
    pub user: String,

    /// Channel the messages are sent to (defaults to the bot's default channel)
    #[arg(long)]
    pub channel: Option<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Messages to send; read from stdin, one per line, when omitted
    pub messages: Vec<String>,
}

/// Validate a bot configuration
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to bot YAML file
    #[arg(short, long)]
    pub config: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
