//! GenerationClient -- resilient wrapper around a completion provider and an
//! embedder.
//!
//! Every buffered call runs the same protocol: throttle, call, validate,
//! clean, and on failure sleep a jittered backoff before trying again. Only
//! `generate_response` adds duplicate suppression. Streaming is a single
//! attempt bounded by a wall-clock deadline. Embeddings never fail outward.

use std::pin::Pin;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use futures_util::{Stream, StreamExt};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{Instrument, debug, error, info_span, warn};

use murmur_types::config::{EmbeddingConfig, GenerationConfig, GlobalConfig};
use murmur_types::error::GenerationError;
use murmur_types::llm::{CompletionRequest, LlmError, Message, SamplingParams, StreamEvent};
use murmur_types::persona::{GenerationRequest, TextOptions};

use crate::llm::box_provider::BoxLlmProvider;
use crate::memory::box_embedder::BoxEmbedder;

use super::backoff::BackoffPolicy;
use super::cleanup::{
    MIN_COMPLETION_CHARS, STOP_SEQUENCES, clean_completion, is_substantive, strip_stop_sequences,
};
use super::dedup::DuplicateCache;
use super::prompt::{build_messages, sampling_for_attempt};
use super::throttle::RequestThrottle;

/// Temperature for one-shot prompts when the caller does not pick one.
const DEFAULT_TEXT_TEMPERATURE: f64 = 0.7;

/// Upper bound on a server-requested `Retry-After` wait.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

/// A lazily produced sequence of text deltas.
pub type TextStream = Pin<Box<dyn Stream<Item = String> + Send + 'static>>;

/// Resilient completion and embedding client.
///
/// Throttle and duplicate cache are private to one instance; share the
/// client (e.g. behind an `Arc`) to share them.
pub struct GenerationClient {
    provider: BoxLlmProvider,
    embedder: BoxEmbedder,
    model: String,
    config: GenerationConfig,
    embedding: EmbeddingConfig,
    throttle: RequestThrottle,
    dedup: DuplicateCache,
    backoff: BackoffPolicy,
    rng: Mutex<StdRng>,
}

impl GenerationClient {
    pub fn new(provider: BoxLlmProvider, embedder: BoxEmbedder, config: &GlobalConfig) -> Self {
        let generation = config.generation.clone();
        Self {
            provider,
            embedder,
            model: config.provider.model.clone(),
            throttle: RequestThrottle::new(Duration::from_millis(
                generation.min_request_interval_ms,
            )),
            dedup: DuplicateCache::new(Duration::from_secs(generation.duplicate_window_secs)),
            backoff: BackoffPolicy::from_config(&generation),
            config: generation,
            embedding: config.embedding.clone(),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Produce one utterance for `request.persona`.
    ///
    /// Empty, too-short and recently repeated completions are retried like
    /// transport failures. Fails only after `max_attempts`.
    pub async fn generate_response(
        &self,
        request: &GenerationRequest,
    ) -> Result<String, GenerationError> {
        let span = info_span!(
            "gen_ai.generate_response",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %self.model,
            gen_ai.request.max_tokens = self.config.max_tokens,
            conversation_id = %request.conversation_id,
            persona = %request.persona.name,
        );

        async {
            let messages = build_messages(request);
            let max_attempts = self.max_attempts();
            let mut last_error = LlmError::EmptyCompletion {
                min_chars: MIN_COMPLETION_CHARS,
            };

            for attempt in 0..max_attempts {
                let sampling = sampling_for_attempt(request.persona.temperature, attempt);
                let result = self
                    .complete_once(&messages, sampling, self.config.max_tokens)
                    .await
                    .map(|raw| clean_completion(&raw, &request.persona.name))
                    .and_then(|text| self.accept(&request.conversation_id, text));

                match result {
                    Ok(text) => {
                        debug!(attempt = attempt + 1, chars = text.len(), "generation accepted");
                        return Ok(text);
                    }
                    Err(err) => {
                        last_error = err;
                        self.after_failure(attempt, max_attempts, &last_error).await;
                    }
                }
            }

            error!(attempts = max_attempts, error = %last_error, "generation exhausted retries");
            Err(GenerationError::Failed {
                attempts: max_attempts,
                last_error,
            })
        }
        .instrument(span)
        .await
    }

    /// One-shot prompt completion with the same retry protocol, without
    /// duplicate suppression.
    pub async fn generate_text(
        &self,
        prompt: &str,
        options: &TextOptions,
    ) -> Result<String, GenerationError> {
        let max_tokens = options.max_tokens.unwrap_or(self.config.max_tokens);
        let temperature = options.temperature.unwrap_or(DEFAULT_TEXT_TEMPERATURE);
        let span = info_span!(
            "gen_ai.generate_text",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %self.model,
            gen_ai.request.max_tokens = max_tokens,
            gen_ai.request.temperature = temperature,
        );

        async {
            let mut messages = Vec::with_capacity(2);
            if let Some(system) = options.system.as_deref() {
                messages.push(Message::system(system));
            }
            messages.push(Message::user(prompt));

            let max_attempts = self.max_attempts();
            let mut last_error = LlmError::EmptyCompletion {
                min_chars: MIN_COMPLETION_CHARS,
            };

            for attempt in 0..max_attempts {
                let sampling = sampling_for_attempt(temperature, attempt);
                let result = self
                    .complete_once(&messages, sampling, max_tokens)
                    .await
                    .map(|raw| strip_stop_sequences(&raw))
                    .and_then(|text| {
                        if is_substantive(&text) {
                            Ok(text)
                        } else {
                            Err(LlmError::EmptyCompletion {
                                min_chars: MIN_COMPLETION_CHARS,
                            })
                        }
                    });

                match result {
                    Ok(text) => return Ok(text),
                    Err(err) => {
                        last_error = err;
                        self.after_failure(attempt, max_attempts, &last_error).await;
                    }
                }
            }

            error!(attempts = max_attempts, error = %last_error, "text generation exhausted retries");
            Err(GenerationError::Failed {
                attempts: max_attempts,
                last_error,
            })
        }
        .instrument(span)
        .await
    }

    /// Stream one utterance as text deltas.
    ///
    /// Single attempt, no retry and no duplicate check. The stream ends
    /// quietly when the provider finishes, when it fails (logged), or when
    /// `stream_timeout_secs` elapse; whatever arrived before that stands.
    pub async fn stream_response(&self, request: &GenerationRequest) -> TextStream {
        self.throttle.acquire().await;

        let completion = CompletionRequest {
            model: self.model.clone(),
            messages: build_messages(request),
            max_tokens: self.config.max_tokens,
            sampling: sampling_for_attempt(request.persona.temperature, 0),
            stream: true,
            stop_sequences: stop_sequences(),
        };

        let span = info_span!(
            "gen_ai.stream_response",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %self.model,
            gen_ai.request.stream = true,
            conversation_id = %request.conversation_id,
        );
        let timeout = Duration::from_secs(self.config.stream_timeout_secs);
        let deadline = tokio::time::Instant::now() + timeout;
        let mut events = self.provider.stream(completion);

        Box::pin(async_stream::stream! {
            loop {
                let next = tokio::time::timeout_at(deadline, events.next())
                    .instrument(span.clone())
                    .await;
                match next {
                    Err(_) => {
                        span.in_scope(|| warn!(timeout_secs = timeout.as_secs(), "stream deadline reached"));
                        break;
                    }
                    Ok(None) | Ok(Some(Ok(StreamEvent::Done))) => break,
                    Ok(Some(Ok(StreamEvent::TextDelta { text }))) => yield text,
                    Ok(Some(Ok(StreamEvent::Usage(usage)))) => {
                        span.in_scope(|| debug!(
                            input_tokens = usage.input_tokens,
                            output_tokens = usage.output_tokens,
                            "stream usage"
                        ));
                    }
                    Ok(Some(Ok(_))) => {}
                    Ok(Some(Err(err))) => {
                        span.in_scope(|| warn!(error = %err, "stream ended by provider error"));
                        break;
                    }
                }
            }
        })
    }

    /// Drain [`stream_response`](Self::stream_response) into one string.
    ///
    /// Partial output is returned as-is when the stream is cut short.
    pub async fn collect_stream(&self, request: &GenerationRequest) -> String {
        let stream = self.stream_response(request).await;
        let text: String = stream.collect::<Vec<_>>().await.concat();
        strip_stop_sequences(&text)
    }

    /// Embed `text`, falling back to a constant placeholder vector.
    ///
    /// Empty and all-zero vectors are retried. Never fails.
    pub async fn create_embedding(&self, text: &str) -> Vec<f32> {
        let span = info_span!(
            "gen_ai.embeddings",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %self.embedder.model_name(),
        );

        async {
            let inputs = [text.to_string()];
            let max_attempts = self.max_attempts();

            for attempt in 0..max_attempts {
                self.throttle.acquire().await;
                let result = self
                    .embedder
                    .embed(&inputs)
                    .await
                    .and_then(|vectors| vectors.into_iter().next().ok_or(LlmError::InvalidEmbedding))
                    .and_then(|vector| {
                        if vector.is_empty() || vector.iter().all(|v| *v == 0.0) {
                            Err(LlmError::InvalidEmbedding)
                        } else {
                            Ok(vector)
                        }
                    });

                match result {
                    Ok(vector) => return vector,
                    Err(err) => self.after_failure(attempt, max_attempts, &err).await,
                }
            }

            error!(
                attempts = max_attempts,
                dimension = self.embedding.dimension,
                "embedding failed; using placeholder vector"
            );
            self.placeholder_embedding()
        }
        .instrument(span)
        .await
    }

    /// The vector returned when every embedding attempt fails.
    pub fn placeholder_embedding(&self) -> Vec<f32> {
        vec![self.embedding.placeholder_value; self.embedding.dimension]
    }

    fn max_attempts(&self) -> u32 {
        self.config.max_attempts.max(1)
    }

    /// Throttle, send one buffered completion, return the raw text.
    async fn complete_once(
        &self,
        messages: &[Message],
        sampling: SamplingParams,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        self.throttle.acquire().await;

        debug!(
            temperature = sampling.temperature,
            frequency_penalty = sampling.frequency_penalty,
            "sending completion"
        );
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: messages.to_vec(),
            max_tokens,
            sampling,
            stream: false,
            stop_sequences: stop_sequences(),
        };

        let response = self.provider.complete(&request).await?;
        debug!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            stop_reason = %response.stop_reason,
            "completion received"
        );

        if !is_substantive(&response.content) {
            return Err(LlmError::EmptyCompletion {
                min_chars: MIN_COMPLETION_CHARS,
            });
        }
        Ok(response.content)
    }

    /// Validate cleaned persona text and register it with the duplicate cache.
    fn accept(&self, conversation_id: &str, text: String) -> Result<String, LlmError> {
        if !is_substantive(&text) {
            return Err(LlmError::EmptyCompletion {
                min_chars: MIN_COMPLETION_CHARS,
            });
        }
        if self.dedup.check_and_register(conversation_id, &text) {
            return Err(LlmError::DuplicateCompletion {
                conversation_id: conversation_id.to_string(),
            });
        }
        Ok(text)
    }

    /// Log a failed attempt and back off unless it was the last one.
    async fn after_failure(&self, attempt: u32, max_attempts: u32, err: &LlmError) {
        let remaining = max_attempts - attempt - 1;
        if remaining == 0 {
            warn!(attempt = attempt + 1, error = %err, "final attempt failed");
            return;
        }
        let backoff = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            self.backoff.delay_for(attempt, &mut *rng)
        };
        let delay = match err {
            LlmError::RateLimited {
                retry_after_ms: Some(ms),
            } => backoff.max(Duration::from_millis(*ms).min(MAX_RETRY_AFTER)),
            _ => backoff,
        };
        warn!(
            attempt = attempt + 1,
            remaining,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "attempt failed, backing off"
        );
        tokio::time::sleep(delay).await;
    }
}

fn stop_sequences() -> Vec<String> {
    STOP_SEQUENCES.iter().map(|s| s.to_string()).collect()
}
