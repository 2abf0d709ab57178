//! Conversation dynamics and resilient generation for murmur.
//!
//! This crate defines the ports (`LlmProvider`, `Embedder`,
//! `ConversationStore`) that the infrastructure layer implements. It depends
//! only on `murmur-types`, never on `murmur-infra` or any HTTP crate.

pub mod dynamics;
pub mod generation;
pub mod llm;
pub mod memory;
