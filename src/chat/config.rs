//! Chat bot configuration from YAML

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Top-level bot configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Bot name, also used to label its pipeline
    pub name: String,

    /// The bot's own user name; messages it sent are ignored
    pub username: String,

    /// Prefix that marks a message as a command
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Channel used when the caller does not name one
    #[serde(default = "default_channel")]
    pub default_channel: String,

    /// Reply template for prefixed messages no command handles
    ///
    /// When absent, such messages fail with an unknown command error.
    #[serde(default)]
    pub unknown_reply: Option<String>,

    /// Bot commands, tried in order
    pub commands: Vec<CommandConfig>,
}

/// Command configuration as defined in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandConfig {
    /// Unique command name
    pub name: String,

    /// Optional command description
    #[serde(default)]
    pub description: Option<String>,

    /// Case-insensitive prefix of the message, or a regex when `use_regex` is set
    pub trigger: String,

    /// Whether to use regex pattern matching
    #[serde(default)]
    pub use_regex: bool,

    /// What the command does
    #[serde(default = "default_action")]
    pub action: CommandAction,

    /// Reply template; variables are written as `{{ name }}`
    #[serde(default)]
    pub reply: Option<String>,
}

/// Action taken when a command's trigger matches
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CommandAction {
    /// Render the reply template
    Reply,
    /// Increment the counter named by the first argument and report it
    Counter,
}

fn default_prefix() -> String {
    "!".to_string()
}

fn default_channel() -> String {
    "#general".to_string()
}

fn default_action() -> CommandAction {
    CommandAction::Reply
}

impl BotConfig {
    /// Load bot configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse bot configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: BotConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the bot configuration
    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            anyhow::bail!("Bot '{}' has an empty username", self.name);
        }

        if self.prefix.is_empty() {
            anyhow::bail!("Bot '{}' has an empty command prefix", self.name);
        }

        if self.commands.is_empty() {
            anyhow::bail!("Bot '{}' defines no commands", self.name);
        }

        let mut seen_names = HashSet::new();
        for command in &self.commands {
            if !seen_names.insert(&command.name) {
                anyhow::bail!("Duplicate command name: {}", command.name);
            }

            if command.trigger.is_empty() {
                anyhow::bail!("Command '{}' has an empty trigger", command.name);
            }

            if command.use_regex {
                if let Err(e) = Regex::new(&command.trigger) {
                    anyhow::bail!("Command '{}' has an invalid trigger regex: {}", command.name, e);
                }
            }

            if command.action == CommandAction::Reply && command.reply.is_none() {
                anyhow::bail!(
                    "Command '{}' has action 'reply' but no reply template specified",
                    command.name
                );
            }
        }

        Ok(())
    }

    /// Look up a command by name
    pub fn command(&self, name: &str) -> Option<&CommandConfig> {
        self.commands.iter().find(|c| c.name == name)
    }
}
