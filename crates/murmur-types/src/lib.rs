//! Shared domain types for murmur.
//!
//! This crate contains the types shared by the dynamics engine, the
//! generation client and their infrastructure adapters: conversation state,
//! styles, personas, LLM request/response shapes, configuration, and errors.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod config;
pub mod conversation;
pub mod error;
pub mod llm;
pub mod persona;
pub mod style;
