//! Conversation state storage.
//!
//! The dynamics engine never owns a global map: it is handed a
//! `ConversationStore`, and whoever builds the store decides on eviction
//! (LRU, TTL, explicit `remove` when a room closes).

use std::sync::Arc;

use dashmap::DashMap;

use murmur_types::conversation::ConversationState;

/// Storage port for per-conversation dynamics state.
///
/// Values are cloned on read and replaced whole on write, so no guard is
/// ever held by the caller.
pub trait ConversationStore: Send + Sync {
    fn load(&self, conversation_id: &str) -> Option<ConversationState>;

    fn save(&self, conversation_id: &str, state: ConversationState);

    fn remove(&self, conversation_id: &str) -> Option<ConversationState>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-memory store backed by `DashMap`.
///
/// Cloning produces a shared view of the same map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConversationStore {
    inner: Arc<DashMap<String, ConversationState>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of every conversation currently held.
    pub fn conversation_ids(&self) -> Vec<String> {
        self.inner.iter().map(|entry| entry.key().clone()).collect()
    }
}

impl ConversationStore for InMemoryConversationStore {
    fn load(&self, conversation_id: &str) -> Option<ConversationState> {
        self.inner.get(conversation_id).map(|entry| entry.value().clone())
    }

    fn save(&self, conversation_id: &str, state: ConversationState) {
        self.inner.insert(conversation_id.to_string(), state);
    }

    fn remove(&self, conversation_id: &str) -> Option<ConversationState> {
        self.inner.remove(conversation_id).map(|(_, state)| state)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    #[test]
    fn save_load_remove() {
        let store = InMemoryConversationStore::new();
        assert!(store.is_empty());
        assert!(store.load("room").is_none());

        let mut state = ConversationState::new(Local::now());
        state.interaction_count = 4;
        store.save("room", state);

        assert_eq!(store.len(), 1);
        assert_eq!(store.load("room").unwrap().interaction_count, 4);
        assert_eq!(store.conversation_ids(), vec!["room".to_string()]);

        let removed = store.remove("room").unwrap();
        assert_eq!(removed.interaction_count, 4);
        assert!(store.is_empty());
    }

    #[test]
    fn clones_share_the_same_map() {
        let store = InMemoryConversationStore::new();
        let view = store.clone();
        store.save("a", ConversationState::new(Local::now()));
        assert_eq!(view.len(), 1);
    }
}
