//! Persona and transcript types consumed by prompt assembly.

use serde::{Deserialize, Serialize};

/// The agent that is about to speak.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    pub name: String,
    pub system_prompt: String,
    /// Base sampling temperature before per-attempt scaling.
    pub temperature: f64,
}

/// One prior message in the conversation window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Display name of whoever wrote the message.
    pub speaker: String,
    pub content: String,
}

impl HistoryEntry {
    pub fn new(speaker: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            content: content.into(),
        }
    }
}

/// Everything needed to generate one utterance for one conversation.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub conversation_id: String,
    pub persona: Persona,
    /// Oldest first. Truncated to the last `max_history` entries.
    pub history: Vec<HistoryEntry>,
    /// Resolved style-aware instructions appended to the persona prompt.
    pub system_prompt: String,
    pub max_history: usize,
}

impl GenerationRequest {
    pub fn new(
        conversation_id: impl Into<String>,
        persona: Persona,
        history: Vec<HistoryEntry>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            persona,
            history,
            system_prompt: system_prompt.into(),
            max_history: 10,
        }
    }

    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }
}

/// Options for a one-shot prompt completion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextOptions {
    pub system: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}
