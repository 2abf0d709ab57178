//! Welcome banner display for chat sessions.

use console::style;

/// Print the welcome banner at the start of a chat session.
pub fn print_welcome_banner(persona: &str, provider: &str, model: &str, streaming: bool) {
    println!();
    println!("  {}", style(persona).cyan().bold());
    println!();
    println!("  {}  {} / {}", style("Model:").bold(), provider, style(model).dim());
    println!(
        "  {}   {}",
        style("Mode:").bold(),
        style(if streaming { "streaming" } else { "buffered" }).dim()
    );
    println!();
    println!(
        "  {}",
        style("Type /help for commands, Ctrl+D to exit").dim()
    );
    println!("  {}", style("---").dim());
    println!();
}
