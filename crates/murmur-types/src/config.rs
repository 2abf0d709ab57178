//! Global configuration types for murmur.
//!
//! `GlobalConfig` represents the top-level `config.toml` that controls the
//! completion provider, the generation client's retry protocol, and the
//! embedding fallback. Every field has a default so an empty file is valid.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

/// Where completions and embeddings are requested from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Human-readable name used in logs and spans.
    #[serde(default = "default_provider_name")]
    pub name: String,
    /// Base URL of an OpenAI-compatible API (without trailing slash).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Chat completion model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Embedding model identifier.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// HTTP request timeout for buffered calls, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_provider_name() -> String {
    "together".to_string()
}

fn default_base_url() -> String {
    "https://api.together.xyz/v1".to_string()
}

fn default_model() -> String {
    "meta-llama/Llama-3.3-70B-Instruct-Turbo".to_string()
}

fn default_embedding_model() -> String {
    "BAAI/bge-large-en-v1.5".to_string()
}

fn default_api_key_env() -> String {
    "MURMUR_API_KEY".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: default_provider_name(),
            base_url: default_base_url(),
            model: default_model(),
            embedding_model: default_embedding_model(),
            api_key_env: default_api_key_env(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Retry, throttle and deduplication knobs for the generation client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Total attempts per buffered call (first try included).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Minimum spacing between any two outbound requests of one client.
    #[serde(default = "default_min_request_interval_ms")]
    pub min_request_interval_ms: u64,
    #[serde(default = "default_duplicate_window_secs")]
    pub duplicate_window_secs: u64,
    /// Wall-clock budget for a streaming call.
    #[serde(default = "default_stream_timeout_secs")]
    pub stream_timeout_secs: u64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_max_history")]
    pub max_history: usize,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1_000
}

fn default_max_delay_ms() -> u64 {
    10_000
}

fn default_min_request_interval_ms() -> u64 {
    2_000
}

fn default_duplicate_window_secs() -> u64 {
    30
}

fn default_stream_timeout_secs() -> u64 {
    30
}

fn default_max_tokens() -> u32 {
    256
}

fn default_max_history() -> usize {
    10
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            min_request_interval_ms: default_min_request_interval_ms(),
            duplicate_window_secs: default_duplicate_window_secs(),
            stream_timeout_secs: default_stream_timeout_secs(),
            max_tokens: default_max_tokens(),
            max_history: default_max_history(),
        }
    }
}

/// Shape of the placeholder vector returned when embedding fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_dimension")]
    pub dimension: usize,
    #[serde(default = "default_placeholder_value")]
    pub placeholder_value: f32,
}

fn default_dimension() -> usize {
    1536
}

fn default_placeholder_value() -> f32 {
    0.1
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dimension: default_dimension(),
            placeholder_value: default_placeholder_value(),
        }
    }
}
