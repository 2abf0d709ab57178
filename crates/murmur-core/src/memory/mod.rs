//! Embedding port used for memory indexing context.

pub mod box_embedder;
pub mod embedder;
