//! OpenAI-compatible chat completions provider (OpenAI, Together, Groq,
//! vLLM, Ollama and other hosts speaking the same wire format).

pub mod client;
pub mod streaming;
pub mod types;

pub use client::ChatCompletionsProvider;

use murmur_types::llm::LlmError;

/// Map a non-success HTTP status and body to an [`LlmError`].
pub fn error_for_status(status: u16, body: String, retry_after_ms: Option<u64>) -> LlmError {
    match status {
        401 | 403 => LlmError::AuthenticationFailed,
        429 => LlmError::RateLimited { retry_after_ms },
        400 | 404 | 422 => LlmError::InvalidRequest(body),
        503 | 529 => LlmError::Overloaded(body),
        _ => LlmError::Provider {
            message: format!("HTTP {status}: {body}"),
        },
    }
}

/// Parse a `Retry-After` header given in whole seconds.
pub fn retry_after_ms(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(|secs| secs.saturating_mul(1_000))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};

    #[test]
    fn status_mapping() {
        assert!(matches!(
            error_for_status(401, String::new(), None),
            LlmError::AuthenticationFailed
        ));
        assert!(matches!(
            error_for_status(429, String::new(), Some(2_000)),
            LlmError::RateLimited { retry_after_ms: Some(2_000) }
        ));
        assert!(matches!(
            error_for_status(400, "bad".into(), None),
            LlmError::InvalidRequest(body) if body == "bad"
        ));
        assert!(matches!(error_for_status(503, String::new(), None), LlmError::Overloaded(_)));
        assert!(matches!(error_for_status(500, String::new(), None), LlmError::Provider { .. }));
    }

    #[test]
    fn retry_after_header_in_seconds() {
        let mut headers = HeaderMap::new();
        assert_eq!(retry_after_ms(&headers), None);
        headers.insert(RETRY_AFTER, HeaderValue::from_static(" 3 "));
        assert_eq!(retry_after_ms(&headers), Some(3_000));
        headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"));
        assert_eq!(retry_after_ms(&headers), None);
    }
}
