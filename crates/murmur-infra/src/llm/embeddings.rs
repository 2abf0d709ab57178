//! Embedder for OpenAI-compatible `/embeddings` endpoints.

use secrecy::{ExposeSecret, SecretString};

use murmur_core::memory::embedder::Embedder;
use murmur_types::config::ProviderConfig;
use murmur_types::error::ConfigError;
use murmur_types::llm::LlmError;

use super::chat_completions::client::build_http_client;
use super::chat_completions::types::{EmbeddingBody, EmbeddingResponse};
use super::chat_completions::{error_for_status, retry_after_ms};

/// Remote embedder. Intentionally does not derive `Debug`.
pub struct RemoteEmbedder {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl RemoteEmbedder {
    pub fn new(config: &ProviderConfig, api_key: SecretString) -> Result<Self, ConfigError> {
        Ok(Self {
            client: build_http_client(config.request_timeout_secs)?,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.embedding_model.clone(),
        })
    }

    fn url(&self) -> String {
        format!("{}/embeddings", self.base_url)
    }
}

impl Embedder for RemoteEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        let body = EmbeddingBody {
            model: self.model.clone(),
            input: texts.to_vec(),
        };

        let response = self
            .client
            .post(self.url())
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after_ms(response.headers());
            let error_body = response.text().await.unwrap_or_default();
            return Err(error_for_status(status.as_u16(), error_body, retry_after));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse embeddings: {e}")))?;

        into_vectors(parsed, texts.len())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Order vectors by their `index` and check one came back per input.
pub fn into_vectors(
    mut response: EmbeddingResponse,
    expected: usize,
) -> Result<Vec<Vec<f32>>, LlmError> {
    if response.data.len() != expected {
        return Err(LlmError::Deserialization(format!(
            "expected {expected} embeddings, got {}",
            response.data.len()
        )));
    }
    response.data.sort_by_key(|d| d.index);
    Ok(response.data.into_iter().map(|d| d.embedding).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_embedding_model_from_config() {
        let embedder =
            RemoteEmbedder::new(&ProviderConfig::default(), SecretString::from("k")).unwrap();
        assert_eq!(embedder.model_name(), "BAAI/bge-large-en-v1.5");
        assert_eq!(embedder.url(), "https://api.together.xyz/v1/embeddings");
    }

    #[test]
    fn vectors_are_ordered_by_index() {
        let raw = r#"{"data":[{"index":1,"embedding":[2.0]},{"index":0,"embedding":[1.0]}]}"#;
        let parsed: EmbeddingResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(into_vectors(parsed, 2).unwrap(), vec![vec![1.0], vec![2.0]]);
    }

    #[test]
    fn count_mismatch_is_an_error() {
        let parsed: EmbeddingResponse = serde_json::from_str(r#"{"data":[]}"#).unwrap();
        assert!(into_vectors(parsed, 1).is_err());
    }
}
