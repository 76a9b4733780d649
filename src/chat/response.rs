//! Chat bot response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for chat dispatch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    /// Stop handling the message without replying
    #[error("message ignored")]
    Exit,

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("failed to deliver reply to {channel}: {reason}")]
    Delivery { channel: String, reason: String },
}

impl ChatError {
    /// Whether the error only means "nothing to do"
    pub fn is_exit(error: &anyhow::Error) -> bool {
        matches!(error.downcast_ref::<ChatError>(), Some(ChatError::Exit))
    }
}

/// A reply delivered to a channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub channel: String,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

impl Reply {
    pub fn new(channel: String, text: String) -> Self {
        Self {
            channel,
            text,
            sent_at: Utc::now(),
        }
    }
}

/// A message the bot decided not to answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skipped {
    pub channel: String,
    pub user: String,
}
