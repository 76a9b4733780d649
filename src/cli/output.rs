//! CLI output formatting

use crate::chat::{BotConfig, Command, CommandAction, Dispatch};
use crate::core::{Settled, StepKind};
use console::Emoji;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static SKIP: Emoji<'_, '_> = Emoji("💤 ", "- ");

/// Format the result of handling one message
pub fn format_dispatch(message: &str, dispatch: &Dispatch) -> String {
    match dispatch {
        Settled::Completed(reply) => format!(
            "{} {} → {}",
            CHECK,
            style(message).dim(),
            style(&reply.text).green()
        ),
        Settled::Recovered(skipped) => format!(
            "{} {} {}",
            SKIP,
            style(message).dim(),
            style(format!("(ignored, from {})", skipped.user)).dim()
        ),
    }
}

/// Format a message that failed to dispatch
pub fn format_failure(message: &str, error: &anyhow::Error) -> String {
    format!("{} {}: {}", CROSS, style(message).dim(), style(error).red())
}

/// Format a command action for display
pub fn format_action(action: CommandAction) -> String {
    match action {
        CommandAction::Reply => style("reply").cyan().to_string(),
        CommandAction::Counter => style("counter").yellow().to_string(),
    }
}

/// Format a pipeline's step list, e.g. `catch → tap → pipe`
pub fn format_steps(steps: &[StepKind]) -> String {
    steps
        .iter()
        .map(|kind| {
            if kind.passes_value_through() {
                style(kind).dim().to_string()
            } else {
                style(kind).to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" → ")
}

/// Summary lines for a valid configuration
pub fn format_config_summary(config: &BotConfig) -> Vec<String> {
    let mut lines = vec![
        format!("  Name: {}", style(&config.name).bold()),
        format!("  User: {}", style(&config.username).cyan()),
        format!("  Prefix: {}", style(&config.prefix).cyan()),
        format!("  Commands: {}", style(config.commands.len()).cyan()),
    ];

    for command in &config.commands {
        let trigger = Command::from_config(command).trigger;
        lines.push(format!(
            "    {} {} ({})",
            style(&command.name).bold(),
            style(trigger.to_string()).dim(),
            format_action(command.action)
        ));
    }

    lines
}
