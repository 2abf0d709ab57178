//! LLM provider implementations.
//!
//! Concrete implementations of the [`LlmProvider`] and [`Embedder`] ports
//! defined in `murmur-core`, plus factories that build them from
//! [`ProviderConfig`]. Construction fails fast on bad configuration; nothing
//! here retries.
//!
//! [`LlmProvider`]: murmur_core::llm::provider::LlmProvider
//! [`Embedder`]: murmur_core::memory::embedder::Embedder

pub mod chat_completions;
pub mod embeddings;

use secrecy::{ExposeSecret, SecretString};

use murmur_core::llm::box_provider::BoxLlmProvider;
use murmur_core::memory::box_embedder::BoxEmbedder;
use murmur_types::config::ProviderConfig;
use murmur_types::error::ConfigError;

use self::chat_completions::ChatCompletionsProvider;
use self::embeddings::RemoteEmbedder;

/// Create a [`BoxLlmProvider`] from a [`ProviderConfig`].
pub fn create_provider(
    config: &ProviderConfig,
    api_key: &SecretString,
) -> Result<BoxLlmProvider, ConfigError> {
    validate(config)?;
    let provider = ChatCompletionsProvider::new(config, copy_secret(api_key))?;
    tracing::debug!(provider = %config.name, model = %config.model, "created completion provider");
    Ok(BoxLlmProvider::new(provider))
}

/// Create a [`BoxEmbedder`] from a [`ProviderConfig`].
pub fn create_embedder(
    config: &ProviderConfig,
    api_key: &SecretString,
) -> Result<BoxEmbedder, ConfigError> {
    validate(config)?;
    let embedder = RemoteEmbedder::new(config, copy_secret(api_key))?;
    Ok(BoxEmbedder::new(embedder))
}

fn copy_secret(secret: &SecretString) -> SecretString {
    SecretString::from(secret.expose_secret().to_string())
}

fn validate(config: &ProviderConfig) -> Result<(), ConfigError> {
    if !(config.base_url.starts_with("http://") || config.base_url.starts_with("https://")) {
        return Err(ConfigError::Invalid(format!(
            "provider base_url must be an http(s) URL, got '{}'",
            config.base_url
        )));
    }
    if config.model.trim().is_empty() {
        return Err(ConfigError::Invalid("provider model must not be empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factories_build_from_defaults() {
        let config = ProviderConfig::default();
        let provider = create_provider(&config, &SecretString::from("k")).unwrap();
        assert_eq!(provider.name(), "together");
        let embedder = create_embedder(&config, &SecretString::from("k")).unwrap();
        assert_eq!(embedder.model_name(), config.embedding_model);
    }

    #[test]
    fn bad_base_url_fails_fast() {
        let config = ProviderConfig {
            base_url: "api.example.com".to_string(),
            ..ProviderConfig::default()
        };
        assert!(matches!(
            create_provider(&config, &SecretString::from("k")),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn empty_model_fails_fast() {
        let config = ProviderConfig {
            model: "  ".to_string(),
            ..ProviderConfig::default()
        };
        assert!(create_provider(&config, &SecretString::from("k")).is_err());
    }
}
