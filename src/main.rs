use anyhow::{Context, Result};
use std::io::BufRead;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use typepipe::chat::{build_pipeline, BotConfig, ChatBot, ChatSink, ConsoleSink, Envelope, MemorySink};
use typepipe::cli::commands::{ChatCommand, ValidateCommand};
use typepipe::cli::output::*;
use typepipe::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    // Execute command
    match &cli.command {
        Command::Chat(cmd) => chat(cmd).await?,
        Command::Validate(cmd) => validate_config(cmd)?,
    }

    Ok(())
}

async fn chat(cmd: &ChatCommand) -> Result<()> {
    let config = BotConfig::from_file(&cmd.config).context("Failed to load bot config")?;
    let channel = cmd
        .channel
        .clone()
        .unwrap_or_else(|| config.default_channel.clone());

    if !cmd.json {
        println!("{} Loaded bot: {}", INFO, style(&config.name).bold());
    }

    let messages = if cmd.messages.is_empty() {
        read_stdin_messages()?
    } else {
        cmd.messages.clone()
    };

    // Replies go to stdout as they are delivered, unless they are collected for JSON
    let sink: Arc<dyn ChatSink> = if cmd.json {
        Arc::new(MemorySink::new())
    } else {
        Arc::new(ConsoleSink)
    };
    let bot = ChatBot::new(config, sink)?;
    let envelope = Envelope::new(channel, cmd.user.clone());

    let mut results = Vec::new();
    let mut failures = 0;
    for message in &messages {
        match bot.handle(&envelope, message.as_str()).await {
            Ok(dispatch) => {
                if !cmd.json {
                    println!("{}", format_dispatch(message, &dispatch));
                }
                results.push(serde_json::json!({ "message": message, "result": dispatch_json(&dispatch) }));
            }
            Err(e) => {
                failures += 1;
                if !cmd.json {
                    println!("{}", format_failure(message, &e));
                }
                results.push(serde_json::json!({ "message": message, "error": e.to_string() }));
            }
        }
    }

    if cmd.json {
        let data = serde_json::json!({ "bot": bot.config().name, "results": results });
        println!("{}", serde_json::to_string_pretty(&data)?);
    } else if failures > 0 {
        println!(
            "\n{} {} of {} messages failed",
            WARN,
            style(failures).red(),
            messages.len()
        );
    }

    Ok(())
}

fn dispatch_json(dispatch: &typepipe::chat::Dispatch) -> serde_json::Value {
    match dispatch {
        typepipe::Settled::Completed(reply) => serde_json::json!({ "replied": reply }),
        typepipe::Settled::Recovered(skipped) => serde_json::json!({ "skipped": skipped }),
    }
}

fn read_stdin_messages() -> Result<Vec<String>> {
    let stdin = std::io::stdin();
    let mut messages = Vec::new();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read message from stdin")?;
        if !line.trim().is_empty() {
            messages.push(line);
        }
    }
    Ok(messages)
}

fn validate_config(cmd: &ValidateCommand) -> Result<()> {
    if !cmd.json {
        println!("{} Validating bot configuration...", INFO);
    }

    match BotConfig::from_file(&cmd.config) {
        Ok(config) => {
            let pipeline = build_pipeline(&config);

            if cmd.json {
                let data = serde_json::json!({
                    "valid": true,
                    "config": config,
                    "steps": pipeline.steps().iter().map(|s| s.to_string()).collect::<Vec<_>>(),
                });
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                println!("{} Bot configuration is valid!", CHECK);
                for line in format_config_summary(&config) {
                    println!("{}", line);
                }
                println!("  Pipeline: {}", format_steps(pipeline.steps()));
            }
            Ok(())
        }
        Err(e) => {
            if cmd.json {
                let data = serde_json::json!({ "valid": false, "error": format!("{:#}", e) });
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                println!("{} Validation failed:", CROSS);
                println!("  {}", style(format!("{:#}", e)).red());
            }
            std::process::exit(1);
        }
    }
}
