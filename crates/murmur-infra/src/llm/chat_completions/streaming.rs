//! SSE stream for OpenAI-compatible `/chat/completions`.
//!
//! Each `data:` line carries a [`ChatCompletionChunk`]; the stream ends with
//! a literal `[DONE]`. Hosts that honor `stream_options.include_usage` send a
//! final chunk with usage and an empty `choices` array.

use std::pin::Pin;

use eventsource_stream::Eventsource;
use futures_util::{Stream, StreamExt};
use secrecy::{ExposeSecret, SecretString};

use murmur_types::llm::{LlmError, StopReason, StreamEvent, Usage};

use super::{error_for_status, retry_after_ms};
use super::types::{ChatCompletionBody, ChatCompletionChunk};

/// Sentinel payload that terminates the event stream.
const DONE_SENTINEL: &str = "[DONE]";

/// Open a streaming completion and map it to [`StreamEvent`]s.
///
/// Emits `Connected` once the response headers arrive, then deltas, and
/// `Done` when the host sends `[DONE]` or closes the body.
pub fn create_chat_stream(
    client: &reqwest::Client,
    url: &str,
    body: ChatCompletionBody,
    api_key: &SecretString,
) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
    let client = client.clone();
    let url = url.to_string();
    let api_key_str = api_key.expose_secret().to_string();

    Box::pin(async_stream::try_stream! {
        let response = client
            .post(&url)
            .bearer_auth(&api_key_str)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        let response = if !status.is_success() {
            let retry_after = retry_after_ms(response.headers());
            let error_body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %error_body, "stream API error response");
            Err(error_for_status(status.as_u16(), error_body, retry_after))?;
            unreachable!()
        } else {
            response
        };

        yield StreamEvent::Connected;

        let mut events = response.bytes_stream().eventsource();
        while let Some(event) = events.next().await {
            let event = event.map_err(|e| LlmError::Stream(e.to_string()))?;
            let data = event.data.trim();
            if data == DONE_SENTINEL {
                break;
            }
            if data.is_empty() {
                continue;
            }

            let chunk: ChatCompletionChunk = serde_json::from_str(data)
                .map_err(|e| LlmError::Deserialization(format!("stream chunk: {e}")))?;
            for stream_event in chunk_events(chunk) {
                yield stream_event;
            }
        }

        yield StreamEvent::Done;
    })
}

/// Map one chunk to zero or more stream events.
pub fn chunk_events(chunk: ChatCompletionChunk) -> Vec<StreamEvent> {
    let mut events = Vec::new();

    for choice in chunk.choices {
        if let Some(text) = choice.delta.content.filter(|t| !t.is_empty()) {
            events.push(StreamEvent::TextDelta { text });
        }
        if let Some(reason) = choice.finish_reason {
            let stop_reason = reason.parse().unwrap_or(StopReason::EndTurn);
            events.push(StreamEvent::MessageDelta { stop_reason });
        }
    }

    if let Some(usage) = chunk.usage {
        events.push(StreamEvent::Usage(Usage {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
        }));
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use murmur_types::llm::{CompletionRequest, Message, SamplingParams};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response on a local port and return its base URL.
    async fn serve_once(response: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });
        format!("http://{addr}/chat/completions")
    }

    /// Consume request headers and a `content-length` body.
    async fn read_request(socket: &mut tokio::net::TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let content_length = text[..end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + content_length {
                    return;
                }
            }
        }
    }

    fn body() -> ChatCompletionBody {
        let request = CompletionRequest {
            model: "m".to_string(),
            messages: vec![Message::user("hi")],
            max_tokens: 16,
            sampling: SamplingParams::default(),
            stream: true,
            stop_sequences: Vec::new(),
        };
        ChatCompletionBody::from_request(&request, "default", true)
    }

    async fn collect(url: &str) -> Vec<Result<StreamEvent, LlmError>> {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        let key = SecretString::from("test-key-not-real");
        create_chat_stream(&client, url, body(), &key).collect().await
    }

    #[tokio::test]
    async fn sse_body_maps_to_events_until_done() {
        let payload = concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n",
            "data: [DONE]\n\n",
        );
        let response = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{payload}",
            payload.len()
        );
        let url = serve_once(response).await;

        let events = collect(&url).await;
        let events: Vec<StreamEvent> = events.into_iter().map(|e| e.unwrap()).collect();
        assert!(matches!(events.first(), Some(StreamEvent::Connected)));
        let text: String = events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::TextDelta { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(text, "Hello");
        assert!(matches!(events.last(), Some(StreamEvent::Done)));
    }

    #[tokio::test]
    async fn error_status_ends_stream_with_mapped_error() {
        let response = "HTTP/1.1 429 Too Many Requests\r\nretry-after: 3\r\ncontent-length: 4\r\nconnection: close\r\n\r\nslow".to_string();
        let url = serve_once(response).await;

        let events = collect(&url).await;
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            Err(LlmError::RateLimited { retry_after_ms: Some(3_000) })
        ));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_provider_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let events = collect(&format!("http://{addr}/chat/completions")).await;
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Err(LlmError::Provider { .. })));
    }

    fn chunk(raw: &str) -> ChatCompletionChunk {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn text_delta_chunk() {
        let events = chunk_events(chunk(r#"{"choices":[{"delta":{"content":"Hel"}}]}"#));
        assert!(matches!(&events[..], [StreamEvent::TextDelta { text }] if text == "Hel"));
    }

    #[test]
    fn empty_delta_is_skipped() {
        let events = chunk_events(chunk(r#"{"choices":[{"delta":{"role":"assistant","content":""}}]}"#));
        assert!(events.is_empty());
    }

    #[test]
    fn finish_reason_maps_to_stop_reason() {
        let events = chunk_events(chunk(
            r#"{"choices":[{"delta":{},"finish_reason":"length"}]}"#,
        ));
        assert!(matches!(
            &events[..],
            [StreamEvent::MessageDelta { stop_reason: StopReason::MaxTokens }]
        ));
    }

    #[test]
    fn usage_chunk_maps_to_usage_event() {
        let events = chunk_events(chunk(
            r#"{"choices":[],"usage":{"prompt_tokens":20,"completion_tokens":5}}"#,
        ));
        match &events[..] {
            [StreamEvent::Usage(usage)] => {
                assert_eq!(usage.input_tokens, 20);
                assert_eq!(usage.output_tokens, 5);
            }
            other => panic!("unexpected events: {other:?}"),
        }
    }
}
