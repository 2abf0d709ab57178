//! Resilient generation: throttling, jittered backoff, duplicate
//! suppression and stop-sequence cleanup around an `LlmProvider`.

pub mod backoff;
pub mod cleanup;
pub mod client;
pub mod dedup;
pub mod prompt;
pub mod throttle;

pub use client::{GenerationClient, TextStream};
