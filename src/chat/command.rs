//! Command domain model

use crate::chat::config::{CommandAction, CommandConfig};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Pattern deciding whether a command handles a message (not serializable due to Regex)
#[derive(Debug, Clone)]
pub enum Trigger {
    /// Case-insensitive prefix match
    Prefix(String),
    /// Regular expression match
    Regex(Regex),
}

impl Trigger {
    /// Check if the trigger matches the given message text
    pub fn matches(&self, text: &str) -> bool {
        match self {
            Trigger::Prefix(prefix) => text.to_lowercase().starts_with(&prefix.to_lowercase()),
            Trigger::Regex(regex) => regex.is_match(text),
        }
    }

}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Prefix(prefix) => f.write_str(prefix),
            Trigger::Regex(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

/// Who sent a message and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub channel: String,
    pub user: String,
}

impl Envelope {
    pub fn new(channel: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            user: user.into(),
        }
    }
}

/// A command message split into its parts, plus the envelope it arrived in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub channel: String,
    pub user: String,
    /// First word of the message, lowercased
    pub command: String,
    /// Everything after the first word, trimmed
    pub args: String,
}

impl Invocation {
    pub fn parse(text: &str, envelope: &Envelope) -> Self {
        let text = text.trim();
        let (command, args) = match text.split_once(char::is_whitespace) {
            Some((command, args)) => (command, args.trim()),
            None => (text, ""),
        };

        Self {
            channel: envelope.channel.clone(),
            user: envelope.user.clone(),
            command: command.to_lowercase(),
            args: args.to_string(),
        }
    }

    /// First argument, lowercased; empty when there are no arguments
    pub fn first_arg(&self) -> String {
        self.args
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase()
    }

    /// Variables available to reply templates
    pub fn variables(&self) -> HashMap<String, String> {
        HashMap::from([
            ("channel".to_string(), self.channel.clone()),
            ("user".to_string(), self.user.clone()),
            ("command".to_string(), self.command.clone()),
            ("args".to_string(), self.args.clone()),
        ])
    }
}

/// A single bot command
#[derive(Debug, Clone)]
pub struct Command {
    pub name: String,
    pub trigger: Trigger,
    pub action: CommandAction,
    /// Reply template
    pub reply: String,
}

impl Command {
    /// Create a command from a command config
    pub fn from_config(config: &CommandConfig) -> Self {
        let trigger = if config.use_regex {
            match Regex::new(&config.trigger) {
                Ok(regex) => Trigger::Regex(regex),
                Err(_) => Trigger::Prefix(config.trigger.clone()),
            }
        } else {
            Trigger::Prefix(config.trigger.clone())
        };

        let reply = match (&config.reply, config.action) {
            (Some(reply), _) => reply.clone(),
            (None, CommandAction::Counter) => "{{ count }}".to_string(),
            (None, CommandAction::Reply) => String::new(),
        };

        Command {
            name: config.name.clone(),
            trigger,
            action: config.action,
            reply,
        }
    }

    /// Render the reply template with variable substitution
    pub fn render_reply(&self, variables: &HashMap<String, String>) -> String {
        render(&self.reply, variables)
    }
}

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{\s*(\w+)\s*\}\}").expect("placeholder pattern is valid")
    })
}

/// Replace variables in the form `{{ variable_name }}`
///
/// Substitution is a single pass over the template, so placeholders inside
/// substituted values are left as written. Unknown variables stay in place.
pub fn render(template: &str, variables: &HashMap<String, String>) -> String {
    placeholder()
        .replace_all(template, |caps: &Captures| match variables.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
