//! ChatCompletionsProvider -- concrete [`LlmProvider`] for OpenAI-compatible
//! `/chat/completions` endpoints.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is only exposed
//! when building the `Authorization` header.

use std::pin::Pin;
use std::time::Duration;

use futures_util::Stream;
use secrecy::{ExposeSecret, SecretString};

use murmur_core::llm::provider::LlmProvider;
use murmur_types::config::ProviderConfig;
use murmur_types::error::ConfigError;
use murmur_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, StopReason, StreamEvent, Usage,
};

use super::streaming::create_chat_stream;
use super::types::{ChatCompletionBody, ChatCompletionResponse};
use super::{error_for_status, retry_after_ms};

/// Provider for any host speaking the OpenAI chat completions format.
///
/// Intentionally does not derive `Debug`.
pub struct ChatCompletionsProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    name: String,
}

impl ChatCompletionsProvider {
    /// Create a provider from config and a resolved API key.
    pub fn new(config: &ProviderConfig, api_key: SecretString) -> Result<Self, ConfigError> {
        let client = build_http_client(config.request_timeout_secs)?;
        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            name: config.name.clone(),
        })
    }

    /// The default model for this provider.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// Build the shared reqwest client with the configured request timeout.
pub(crate) fn build_http_client(timeout_secs: u64) -> Result<reqwest::Client, ConfigError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ConfigError::Invalid(format!("failed to create HTTP client: {e}")))
}

impl LlmProvider for ChatCompletionsProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = ChatCompletionBody::from_request(request, &self.model, false);

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

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;

        into_completion_response(parsed, &body.model)
    }

    fn stream(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
        let body = ChatCompletionBody::from_request(&request, &self.model, true);
        create_chat_stream(&self.client, &self.url(), body, &self.api_key)
    }
}

/// Convert the wire response into the provider-agnostic response.
///
/// Missing choices are a provider error; missing content is an empty
/// string, which the generation client treats as a retryable empty output.
pub fn into_completion_response(
    response: ChatCompletionResponse,
    requested_model: &str,
) -> Result<CompletionResponse, LlmError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::Provider {
            message: "response contained no choices".to_string(),
        })?;

    let stop_reason = choice
        .finish_reason
        .as_deref()
        .and_then(|reason| reason.parse().ok())
        .unwrap_or(StopReason::EndTurn);

    let usage = response
        .usage
        .map(|u| Usage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        })
        .unwrap_or_default();

    let model = if response.model.is_empty() {
        requested_model.to_string()
    } else {
        response.model
    };

    Ok(CompletionResponse {
        id: response.id,
        content: choice.message.content.unwrap_or_default(),
        model,
        stop_reason,
        usage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_provider() -> ChatCompletionsProvider {
        let config = ProviderConfig {
            base_url: "http://localhost:8080/v1/".to_string(),
            ..ProviderConfig::default()
        };
        ChatCompletionsProvider::new(&config, SecretString::from("test-key-not-real")).unwrap()
    }

    #[test]
    fn provider_name_and_url() {
        let provider = make_provider();
        assert_eq!(provider.name(), "together");
        assert_eq!(provider.url(), "http://localhost:8080/v1/chat/completions");
        assert_eq!(provider.model(), ProviderConfig::default().model);
    }

    #[test]
    fn converts_wire_response() {
        let raw = r#"{
            "id": "cmpl-1",
            "model": "llama",
            "choices": [{"message": {"content": "hi there"}, "finish_reason": "length"}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 2}
        }"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        let response = into_completion_response(parsed, "fallback").unwrap();

        assert_eq!(response.id, "cmpl-1");
        assert_eq!(response.content, "hi there");
        assert_eq!(response.model, "llama");
        assert_eq!(response.stop_reason, StopReason::MaxTokens);
        assert_eq!(response.usage.output_tokens, 2);
    }

    #[test]
    fn null_content_becomes_empty_string() {
        let raw = r#"{"choices": [{"message": {"content": null}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        let response = into_completion_response(parsed, "fallback").unwrap();
        assert_eq!(response.content, "");
        assert_eq!(response.model, "fallback");
        assert_eq!(response.stop_reason, StopReason::EndTurn);
    }

    #[test]
    fn no_choices_is_a_provider_error() {
        let parsed: ChatCompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(
            into_completion_response(parsed, "m"),
            Err(LlmError::Provider { .. })
        ));
    }
}
