use std::collections::HashMap;

use maquette_types::{Conversation, ConversationSummary, Message};
use tokio::sync::RwLock;

/// In-memory conversation log, keyed by thread id.
///
/// Entries are retained for the lifetime of the process; eviction is the
/// responsibility of an external layer. Each operation takes the lock once,
/// so individual appends are atomic with respect to each other.
#[derive(Debug, Default)]
pub struct ConversationStore {
    inner: RwLock<HashMap<String, Conversation>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the conversation for `thread_id`, creating an empty one if it
    /// has never been seen. Never fails.
    pub async fn get_or_create(&self, thread_id: &str) -> Conversation {
        let mut map = self.inner.write().await;
        map.entry(thread_id.to_string())
            .or_insert_with(|| Conversation::new(thread_id))
            .clone()
    }

    /// Append a message, creating the conversation if absent
    pub async fn append(&self, thread_id: &str, message: Message) {
        let mut map = self.inner.write().await;
        map.entry(thread_id.to_string())
            .or_insert_with(|| Conversation::new(thread_id))
            .push(message);
    }

    /// Read-only lookup; `None` means the thread was never created
    pub async fn get(&self, thread_id: &str) -> Option<Conversation> {
        self.inner.read().await.get(thread_id).cloned()
    }

    /// Summaries of every stored conversation, in unspecified order
    pub async fn list(&self) -> Vec<ConversationSummary> {
        self.inner
            .read()
            .await
            .values()
            .map(Conversation::summary)
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
