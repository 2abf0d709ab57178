//! murmur CLI entry point.
//!
//! Binary name: `murmur`
//!
//! Parses CLI arguments, sets up tracing and configuration, then dispatches
//! to the command handler.

mod cli;

use clap::Parser;

use murmur_infra::config::{default_data_dir, load_config_file, load_global_config};
use murmur_observe::tracing_setup::{LogFormat, init_tracing, shutdown_tracing};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,murmur=debug",
        _ => "trace",
    };
    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    init_tracing(format, filter, cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let data_dir = cli.data_dir.clone().unwrap_or_else(default_data_dir);
    let config = match &cli.config {
        Some(path) => load_config_file(path).await?,
        None => load_global_config(&data_dir).await,
    };

    let result = match cli.command {
        Commands::Analyze { text } => cli::analyze::analyze(&text, cli.json),
        Commands::Chat {
            persona_name,
            system_prompt,
            temperature,
            stream,
        } => {
            let options = cli::chat::ChatOptions {
                persona_name,
                system_prompt,
                temperature,
                stream,
            };
            cli::chat::loop_runner::run_chat_loop(&config, options).await
        }
        Commands::Config => cli::config::show_config(&config, &data_dir, cli.json),
    };

    shutdown_tracing();
    result
}
