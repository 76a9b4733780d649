//! Destinations for bot replies

use crate::chat::response::{ChatError, Reply};
use crate::cli::output::style;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

/// Trait for reply delivery - allows for different implementations
#[async_trait]
pub trait ChatSink: Send + Sync {
    /// Deliver `text` to `channel`
    async fn say(&self, channel: &str, text: &str) -> Result<(), ChatError>;
}

/// Prints replies to stdout
#[derive(Debug, Clone, Default)]
pub struct ConsoleSink;

#[async_trait]
impl ChatSink for ConsoleSink {
    async fn say(&self, channel: &str, text: &str) -> Result<(), ChatError> {
        println!("{} {}", style(format!("[{}]", channel)).cyan(), text);
        Ok(())
    }
}

/// Keeps every reply in memory, in delivery order
#[derive(Debug, Default)]
pub struct MemorySink {
    replies: Mutex<Vec<Reply>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the replies delivered so far
    pub async fn replies(&self) -> Vec<Reply> {
        self.replies.lock().await.clone()
    }

    /// Remove and return the replies delivered so far
    pub async fn drain(&self) -> Vec<Reply> {
        std::mem::take(&mut *self.replies.lock().await)
    }
}

#[async_trait]
impl ChatSink for MemorySink {
    async fn say(&self, channel: &str, text: &str) -> Result<(), ChatError> {
        debug!("Recording reply for {}: {}", channel, text);
        self.replies
            .lock()
            .await
            .push(Reply::new(channel.to_string(), text.to_string()));
        Ok(())
    }
}
