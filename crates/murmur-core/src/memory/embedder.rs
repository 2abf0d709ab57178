//! Embedder trait for text-to-vector conversion.
//!
//! Implementations (e.g., the OpenAI-compatible `/embeddings` client) live in
//! murmur-infra.

use murmur_types::llm::LlmError;

/// Trait for converting text into embedding vectors.
pub trait Embedder: Send + Sync {
    /// Embed one or more texts into vectors.
    ///
    /// Returns one vector per input text.
    fn embed(
        &self,
        texts: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<Vec<f32>>, LlmError>> + Send;

    /// The model name used for embeddings.
    fn model_name(&self) -> &str;
}
