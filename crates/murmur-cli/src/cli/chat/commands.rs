//! Slash command parsing and execution for the chat loop.

use console::style;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Exit the chat session.
    Exit,
    /// Show the conversation's dynamics state.
    State,
    /// Forget history and dynamics state for this conversation.
    Reset,
    /// Unknown command.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let cmd = trimmed
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase();

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        "/state" => Some(ChatCommand::State),
        "/reset" | "/new" => Some(ChatCommand::Reset),
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

/// Print the help text listing all available commands.
pub fn print_help() {
    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    println!("  {}   Show this help message", style("/help").cyan());
    println!("  {}  Show momentum, silence and style", style("/state").cyan());
    println!("  {}  Forget this conversation", style("/reset").cyan());
    println!("  {}   End the chat session", style("/exit").cyan());
    println!();
}
