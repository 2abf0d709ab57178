//! Interactive chat: a persona whose pacing and style follow the dynamics
//! engine. Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod loop_runner;

/// Persona and transport options for a chat session.
#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub persona_name: String,
    pub system_prompt: String,
    pub temperature: f64,
    pub stream: bool,
}
