//! Prompt assembly and per-attempt sampling for persona turns.

use murmur_types::llm::{Message, SamplingParams};
use murmur_types::persona::{GenerationRequest, HistoryEntry, Persona};

const TEMPERATURE_STEP: f64 = 0.1;
const TEMPERATURE_CAP: f64 = 1.2;
const PENALTY_BASE: f64 = 0.3;
const PENALTY_STEP: f64 = 0.1;
const PENALTY_CAP: f64 = 1.0;
const TOP_P: f64 = 0.9;
const TOP_K: u32 = 50;

/// Build the continuation marker that closes every persona prompt.
pub fn continuation_marker(persona_name: &str) -> String {
    format!(
        "[Reply as {persona_name} with one short, in-character message. \
         Do not write lines for anyone else.]"
    )
}

/// Assemble the message list for one persona turn.
///
/// System prompt first (persona prompt plus style-aware instructions), then
/// the last `max_history` history entries oldest first, then the
/// continuation marker.
pub fn build_messages(request: &GenerationRequest) -> Vec<Message> {
    let persona = &request.persona;
    let mut messages = Vec::with_capacity(request.max_history.min(request.history.len()) + 2);

    messages.push(Message::system(system_prompt(persona, &request.system_prompt)));

    let skip = request.history.len().saturating_sub(request.max_history);
    messages.extend(
        request
            .history
            .iter()
            .skip(skip)
            .map(|entry| history_message(persona, entry)),
    );

    messages.push(Message::user(continuation_marker(&persona.name)));
    messages
}

fn system_prompt(persona: &Persona, style_instructions: &str) -> String {
    let style_instructions = style_instructions.trim();
    if style_instructions.is_empty() {
        persona.system_prompt.clone()
    } else {
        format!("{}\n\n{}", persona.system_prompt.trim_end(), style_instructions)
    }
}

fn history_message(persona: &Persona, entry: &HistoryEntry) -> Message {
    if entry.speaker == persona.name {
        Message::assistant(entry.content.clone())
    } else {
        Message::user(format!("{}: {}", entry.speaker, entry.content))
    }
}

/// Sampling for `attempt` (0-based): temperature and penalties rise per
/// attempt, each capped.
pub fn sampling_for_attempt(base_temperature: f64, attempt: u32) -> SamplingParams {
    let step = f64::from(attempt);
    SamplingParams {
        temperature: (base_temperature + TEMPERATURE_STEP * step).min(TEMPERATURE_CAP),
        top_p: TOP_P,
        top_k: TOP_K,
        frequency_penalty: (PENALTY_BASE + PENALTY_STEP * step).min(PENALTY_CAP),
        presence_penalty: (PENALTY_BASE + PENALTY_STEP * step).min(PENALTY_CAP),
    }
}
