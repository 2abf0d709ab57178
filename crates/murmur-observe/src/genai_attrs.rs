//! OpenTelemetry GenAI semantic-convention names used by murmur spans.
//!
//! `tracing` field names must be literal in the span macros, so murmur-core
//! spells them out inline; these constants name the same fields for code that
//! records them dynamically (`Span::record`) and hold the operation values.

/// The name of the operation being performed (e.g., "chat", "embeddings").
pub const GEN_AI_OPERATION_NAME: &str = "gen_ai.operation.name";

/// The provider name (e.g., "together").
pub const GEN_AI_SYSTEM: &str = "gen_ai.system";

/// The model ID requested.
pub const GEN_AI_REQUEST_MODEL: &str = "gen_ai.request.model";

/// The number of output characters produced by a turn.
pub const GEN_AI_RESPONSE_CHARS: &str = "gen_ai.response.chars";

// --- Operation name values ---

/// A persona turn through `generate_response`.
pub const OP_CHAT: &str = "chat";

/// A persona turn through the streaming path.
pub const OP_STREAM: &str = "chat_stream";

/// Offline text analysis (topics and style) without a provider call.
pub const OP_ANALYZE: &str = "analyze";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_use_genai_namespace() {
        for name in [
            GEN_AI_OPERATION_NAME,
            GEN_AI_SYSTEM,
            GEN_AI_REQUEST_MODEL,
            GEN_AI_RESPONSE_CHARS,
        ] {
            assert!(name.starts_with("gen_ai."), "{name}");
        }
    }
}
