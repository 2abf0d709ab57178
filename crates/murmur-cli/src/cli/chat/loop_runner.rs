//! Main chat loop.
//!
//! Each user line updates the dynamics state, then the engine decides
//! whether the persona speaks. Speaking turns carry the current style's
//! prompt into the generation client. A failed generation is reported and
//! the turn produces no utterance; the loop continues.

use std::io::Write;

use console::style;
use futures_util::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{Instrument, field, info_span};

use murmur_core::dynamics::store::ConversationStore;
use murmur_core::dynamics::{DynamicsEngine, InMemoryConversationStore, TurnDecision};
use murmur_core::generation::GenerationClient;
use murmur_infra::config::resolve_api_key;
use murmur_infra::llm::{create_embedder, create_provider};
use murmur_observe::genai_attrs::{GEN_AI_RESPONSE_CHARS, OP_CHAT, OP_STREAM};
use murmur_types::config::GlobalConfig;
use murmur_types::conversation::ConversationState;
use murmur_types::persona::{GenerationRequest, HistoryEntry, Persona};

use super::ChatOptions;
use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};

/// Speaker name used for the local user in the transcript.
const USER_SPEAKER: &str = "You";

/// Conversation id for the single terminal conversation.
const CONVERSATION_ID: &str = "terminal";

/// Run the interactive chat loop until EOF or `/exit`.
pub async fn run_chat_loop(config: &GlobalConfig, options: ChatOptions) -> anyhow::Result<()> {
    let api_key = resolve_api_key(&config.provider)?;
    let provider = create_provider(&config.provider, &api_key)?;
    let embedder = create_embedder(&config.provider, &api_key)?;
    let client = GenerationClient::new(provider, embedder, config);
    let engine = DynamicsEngine::new(InMemoryConversationStore::new());

    let persona = Persona {
        name: options.persona_name.clone(),
        system_prompt: options.system_prompt.clone(),
        temperature: options.temperature,
    };
    let mut history: Vec<HistoryEntry> = Vec::new();

    print_welcome_banner(&persona.name, client.provider_name(), client.model(), options.stream);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", style(">").green().bold());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = commands::parse(line) {
            match command {
                ChatCommand::Help => commands::print_help(),
                ChatCommand::Exit => break,
                ChatCommand::State => print_state(&engine.get_state(CONVERSATION_ID)),
                ChatCommand::Reset => {
                    engine.store().remove(CONVERSATION_ID);
                    history.clear();
                    println!("  {}", style("Conversation reset.").dim());
                }
                ChatCommand::Unknown(cmd) => {
                    println!("  {} {cmd} (try /help)", style("Unknown command:").yellow());
                }
            }
            continue;
        }

        engine.update_state(CONVERSATION_ID, line);
        history.push(HistoryEntry::new(USER_SPEAKER, line));

        let (style_name, style_prompt) = match engine.plan_turn(CONVERSATION_ID) {
            TurnDecision::Silent => {
                println!("  {}", style(format!("({} stays quiet)", persona.name)).dim());
                continue;
            }
            TurnDecision::Speak {
                style: turn_style,
                style_prompt,
            } => (turn_style, style_prompt),
        };

        let request = GenerationRequest::new(
            CONVERSATION_ID,
            persona.clone(),
            history.clone(),
            style_prompt,
        )
        .with_max_history(config.generation.max_history);

        let operation = if options.stream { OP_STREAM } else { OP_CHAT };
        let span = info_span!(
            "murmur.turn",
            gen_ai.operation.name = operation,
            style = %style_name,
            gen_ai.response.chars = field::Empty,
        );

        let reply = async {
            if options.stream {
                stream_reply(&client, &persona.name, &request).await
            } else {
                buffered_reply(&client, &persona.name, &request).await
            }
        }
        .instrument(span.clone())
        .await;

        if let Some(text) = reply {
            span.record(GEN_AI_RESPONSE_CHARS, text.chars().count());
            history.push(HistoryEntry::new(persona.name.clone(), text));
        }
    }

    Ok(())
}

async fn buffered_reply(
    client: &GenerationClient,
    name: &str,
    request: &GenerationRequest,
) -> Option<String> {
    match client.generate_response(request).await {
        Ok(text) => {
            println!("{} {}", style(format!("{name}:")).cyan().bold(), text);
            Some(text)
        }
        Err(err) => {
            println!("  {} {err}", style("!").red().bold());
            None
        }
    }
}

async fn stream_reply(
    client: &GenerationClient,
    name: &str,
    request: &GenerationRequest,
) -> Option<String> {
    print!("{} ", style(format!("{name}:")).cyan().bold());
    let _ = std::io::stdout().flush();

    let mut deltas = client.stream_response(request).await;
    let mut text = String::new();
    while let Some(delta) = deltas.next().await {
        print!("{delta}");
        let _ = std::io::stdout().flush();
        text.push_str(&delta);
    }
    println!();

    let text = text.trim().to_string();
    if text.is_empty() {
        println!("  {}", style("(no reply)").dim());
        None
    } else {
        Some(text)
    }
}

fn print_state(state: &ConversationState) {
    let topics: Vec<&str> = state.current_topics.iter().map(String::as_str).collect();
    println!();
    println!("  {}     {:.2}", style("Momentum:").bold(), state.momentum);
    println!("  {}      {:.2}", style("Silence:").bold(), state.silence_probability);
    println!("  {}        {}", style("Style:").bold(), state.current_style);
    println!("  {}    {:+.2}", style("Sentiment:").bold(), state.sentiment);
    println!("  {}       {}", style("Topics:").bold(), topics.join(", "));
    println!("  {}      {}", style("Exchanges:").bold(), state.interaction_count);
    println!();
}
