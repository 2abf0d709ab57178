//! Infrastructure layer for murmur.
//!
//! Contains the HTTP implementations of the ports defined in `murmur-core`
//! (OpenAI-compatible chat completions and embeddings) and the config file
//! loader.

pub mod config;
pub mod llm;
