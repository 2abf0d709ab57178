//! Short-window duplicate suppression for accepted completions.
//!
//! Keyed by conversation id plus a hash of the cleaned text. Entries expire
//! after the window and are purged lazily on every lookup.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
struct SeenEntry {
    /// When the text was first accepted. Hits do not refresh it.
    first_seen: Instant,
    /// Times the text has been produced, including the first.
    attempts: u32,
}

/// Remembers recently accepted texts per conversation.
///
/// A single `Mutex` rather than a `DashMap`: purge, lookup and insert must
/// happen as one step across all keys.
#[derive(Debug)]
pub struct DuplicateCache {
    window: Duration,
    entries: Mutex<HashMap<(String, u64), SeenEntry>>,
}

impl DuplicateCache {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Check `text` for `conversation_id` and register it if new.
    ///
    /// Returns `true` when the same text was accepted within the window; the
    /// entry's attempt counter is bumped in that case.
    pub fn check_and_register(&self, conversation_id: &str, text: &str) -> bool {
        let now = Instant::now();
        let key = (conversation_id.to_string(), fingerprint(text));

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|_, entry| now.duration_since(entry.first_seen) < self.window);

        match entries.get_mut(&key) {
            Some(entry) => {
                entry.attempts += 1;
                true
            }
            None => {
                entries.insert(
                    key,
                    SeenEntry {
                        first_seen: now,
                        attempts: 1,
                    },
                );
                false
            }
        }
    }

    /// How many times `text` has been produced for `conversation_id` within
    /// the current window.
    pub fn attempts(&self, conversation_id: &str, text: &str) -> u32 {
        let key = (conversation_id.to_string(), fingerprint(text));
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(&key)
            .filter(|entry| entry.first_seen.elapsed() < self.window)
            .map_or(0, |entry| entry.attempts)
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn fingerprint(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}
