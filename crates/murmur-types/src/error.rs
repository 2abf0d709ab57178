use thiserror::Error;

use crate::llm::LlmError;

/// Terminal errors from the generation client.
///
/// Only raised after the full retry protocol has been exhausted. Callers
/// should treat this as "this turn produced no utterance".
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation failed after {attempts} attempts: {last_error}")]
    Failed {
        attempts: u32,
        #[source]
        last_error: LlmError,
    },
}

impl GenerationError {
    /// The last underlying error observed before giving up.
    pub fn last_error(&self) -> &LlmError {
        match self {
            GenerationError::Failed { last_error, .. } => last_error,
        }
    }
}

/// Construction-time configuration errors. Never retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing credentials: environment variable '{0}' is not set")]
    MissingApiKey(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to read config file '{path}': {message}")]
    Unreadable { path: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_error_display() {
        let err = GenerationError::Failed {
            attempts: 3,
            last_error: LlmError::Provider {
                message: "HTTP 503".to_string(),
            },
        };
        assert!(err.to_string().contains("3 attempts"));
        assert!(err.to_string().contains("HTTP 503"));
        assert!(matches!(err.last_error(), LlmError::Provider { .. }));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingApiKey("LLM_API_KEY".to_string());
        assert_eq!(
            err.to_string(),
            "missing credentials: environment variable 'LLM_API_KEY' is not set"
        );
    }
}
