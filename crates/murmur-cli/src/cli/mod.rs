//! CLI command definitions and dispatch for the `murmur` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod analyze;
pub mod chat;
pub mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Conversation dynamics and resilient generation, from the terminal.
#[derive(Parser)]
#[command(name = "murmur", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    /// Data directory holding config.toml (default: ~/.murmur).
    #[arg(long, global = true, env = "MURMUR_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Explicit config file; errors instead of falling back to defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect topics, sentiment and style for a piece of text (no API calls).
    Analyze {
        /// Text to analyze.
        text: String,
    },

    /// Chat with a persona whose pacing and style follow the conversation.
    Chat {
        /// Name the persona speaks as.
        #[arg(long, default_value = "Murmur")]
        persona_name: String,

        /// Persona system prompt.
        #[arg(
            long,
            default_value = "You are Murmur, a friendly participant in a group chat. You speak briefly and naturally."
        )]
        system_prompt: String,

        /// Base sampling temperature before per-attempt scaling.
        #[arg(long, default_value_t = 0.8)]
        temperature: f64,

        /// Stream replies token by token (single attempt, no retry).
        #[arg(long)]
        stream: bool,
    },

    /// Print the effective configuration.
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        <Cli as clap::CommandFactory>::command().debug_assert();
    }

    #[test]
    fn parses_chat_flags() {
        let cli = Cli::parse_from(["murmur", "-v", "chat", "--stream", "--persona-name", "Ada"]);
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Chat {
                persona_name,
                stream,
                temperature,
                ..
            } => {
                assert_eq!(persona_name, "Ada");
                assert!(stream);
                assert!((temperature - 0.8).abs() < f64::EPSILON);
            }
            _ => panic!("expected chat"),
        }
    }

    #[test]
    fn parses_analyze_with_global_json() {
        let cli = Cli::parse_from(["murmur", "analyze", "hello there", "--json"]);
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Analyze { text } if text == "hello there"));
    }
}
