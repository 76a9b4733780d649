//! Chat bot - dispatches each message through a pipeline
//!
//! The pipeline mirrors how a command bot handles a message: ignore its own
//! messages, ignore anything that is not a command, split the command into
//! parts, pick the matching command and deliver its reply. Every "ignore"
//! is a [`ChatError::Exit`] raised by a step and turned into [`Skipped`] by
//! the handler registered first.

use crate::chat::command::{render, Command, Envelope, Invocation};
use crate::chat::config::{BotConfig, CommandAction};
use crate::chat::response::{ChatError, Reply, Skipped};
use crate::chat::sink::ChatSink;
use crate::core::{Caught, Error, Outcome, Pipeline, Result, Settled};
use crate::execution::Composed;
use crate::steps::Match;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Outcome of handling one message
pub type Dispatch = Settled<Reply, Skipped>;

/// Pipeline run for every incoming message
pub type BotPipeline = Pipeline<String, Envelope, BotGlobal, Reply, Invocation, Caught<Skipped>>;

/// State shared by every message the bot handles
#[derive(Clone)]
pub struct BotGlobal {
    pub config: Arc<BotConfig>,
    pub sink: Arc<dyn ChatSink>,
    pub counters: Arc<Mutex<HashMap<String, u64>>>,
}

impl fmt::Debug for BotGlobal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotGlobal")
            .field("bot", &self.config.name)
            .finish_non_exhaustive()
    }
}

/// Build the message pipeline for `config`
pub fn build_pipeline(config: &BotConfig) -> BotPipeline {
    let commands: Vec<Arc<Command>> = config
        .commands
        .iter()
        .map(|c| Arc::new(Command::from_config(c)))
        .collect();
    let unknown_reply = config.unknown_reply.clone();

    Pipeline::<String, Envelope, BotGlobal>::new()
        .named(config.name.clone())
        .catch(skip)
        .tap(skip_self)
        .pipe(command_text)
        .assert(|_, _| ChatError::Exit)
        .context(|text, envelope, _| Outcome::ok(Invocation::parse(text, envelope)))
        .match_with(move |m| dispatch(m, &commands, unknown_reply))
        .tap(|text, _, _| {
            if text.trim().is_empty() {
                Outcome::fail(ChatError::Exit)
            } else {
                Outcome::ok(())
            }
        })
        .pipe(say)
}

fn skip(error: Error, envelope: &Envelope, _: &BotGlobal) -> Outcome<Skipped> {
    if ChatError::is_exit(&error) {
        debug!("Ignoring message from {} in {}", envelope.user, envelope.channel);
        Outcome::ok(Skipped {
            channel: envelope.channel.clone(),
            user: envelope.user.clone(),
        })
    } else {
        Outcome::Ready(Err(error))
    }
}

fn skip_self(_: &String, envelope: &Envelope, global: &BotGlobal) -> Outcome<()> {
    if envelope.user.eq_ignore_ascii_case(&global.config.username) {
        Outcome::fail(ChatError::Exit)
    } else {
        Outcome::ok(())
    }
}

fn command_text(text: String, _: &Envelope, global: &BotGlobal) -> Outcome<Option<String>> {
    let text = text.trim();
    Outcome::ok(text.starts_with(&global.config.prefix).then(|| text.to_string()))
}

fn dispatch(
    m: Match<String, Invocation, BotGlobal, String>,
    commands: &[Arc<Command>],
    unknown_reply: Option<String>,
) -> Match<String, Invocation, BotGlobal, String> {
    let m = commands.iter().cloned().fold(m, |m, command| {
        let trigger = command.clone();
        m.on(
            move |text, _, _| Outcome::ok(trigger.trigger.matches(text)),
            move |_, invocation, global| respond(&command, invocation, global),
        )
    });

    match unknown_reply {
        Some(template) => m.otherwise(move |_, invocation, _| Outcome::ok(render(&template, &invocation.variables()))),
        None => m.otherwise(|_, invocation, _| {
            Outcome::fail(ChatError::UnknownCommand(invocation.command.clone()))
        }),
    }
}

fn respond(command: &Command, invocation: &Invocation, global: &BotGlobal) -> Outcome<String> {
    debug!("Command {} handling {}", command.name, invocation.command);

    match command.action {
        CommandAction::Reply => Outcome::ok(command.render_reply(&invocation.variables())),
        CommandAction::Counter => {
            let name = invocation.first_arg();
            if name.is_empty() {
                return Outcome::fail(ChatError::Exit);
            }

            let counters = global.counters.clone();
            let template = command.reply.clone();
            let mut variables = invocation.variables();
            Outcome::deferred(async move {
                let count = {
                    let mut counters = counters.lock().await;
                    let count = counters.entry(name.clone()).or_insert(0);
                    *count += 1;
                    *count
                };
                variables.insert("name".to_string(), name);
                variables.insert("count".to_string(), count.to_string());
                Ok(render(&template, &variables))
            })
        }
    }
}

fn say(text: String, invocation: &Invocation, global: &BotGlobal) -> Outcome<Reply> {
    let sink = global.sink.clone();
    let channel = invocation.channel.clone();

    Outcome::deferred(async move {
        sink.say(&channel, &text).await?;
        Ok::<_, Error>(Reply::new(channel, text))
    })
}

/// A configured bot, ready to handle messages
pub struct ChatBot {
    pipeline: Composed<String, Envelope, BotGlobal, Dispatch>,
    global: BotGlobal,
}

impl fmt::Debug for ChatBot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatBot")
            .field("pipeline", &self.pipeline)
            .field("global", &self.global)
            .finish()
    }
}

impl ChatBot {
    pub fn new(config: BotConfig, sink: Arc<dyn ChatSink>) -> Result<Self> {
        let pipeline = build_pipeline(&config).compose()?;
        info!(
            "Chat bot {} ready with {} commands",
            config.name,
            config.commands.len()
        );

        Ok(Self {
            pipeline,
            global: BotGlobal {
                config: Arc::new(config),
                sink,
                counters: Arc::new(Mutex::new(HashMap::new())),
            },
        })
    }

    pub fn config(&self) -> &BotConfig {
        &self.global.config
    }

    /// Handle one message sent by `envelope.user` to `envelope.channel`
    pub fn handle(&self, envelope: &Envelope, text: impl Into<String>) -> Outcome<Dispatch> {
        self.pipeline.call(text.into(), envelope, &self.global)
    }

    /// Current value of a counter
    pub async fn count(&self, name: &str) -> u64 {
        let counters = self.global.counters.lock().await;
        counters.get(&name.to_lowercase()).copied().unwrap_or(0)
    }
}
