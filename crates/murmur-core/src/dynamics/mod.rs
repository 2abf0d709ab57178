//! Conversation dynamics: per-conversation momentum, topic exhaustion,
//! silence probability and style selection.

pub mod engine;
pub mod sentiment;
pub mod store;
pub mod style;
pub mod topics;

pub use engine::{DynamicsEngine, TurnDecision};
pub use store::{ConversationStore, InMemoryConversationStore};
pub use style::StyleCatalog;
