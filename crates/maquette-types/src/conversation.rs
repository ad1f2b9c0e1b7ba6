use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::Message;

/// Maximum characters of the last message carried in a listing summary
pub const PREVIEW_CHARS: usize = 100;

/// A conversation thread: an append-only message log plus timestamps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub thread_id: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create an empty conversation timestamped now
    pub fn new(thread_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            thread_id: thread_id.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message and bump `updated_at`
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.updated_at = Utc::now();
    }

    /// Build the listing summary for this conversation
    pub fn summary(&self) -> ConversationSummary {
        ConversationSummary {
            thread_id: self.thread_id.clone(),
            message_count: self.messages.len(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            last_message: self.messages.last().map(|m| preview(&m.content)),
        }
    }
}

/// Listing view of a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub thread_id: String,
    pub message_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
}

/// Truncate to PREVIEW_CHARS characters, respecting char boundaries
fn preview(content: &str) -> String {
    content.chars().take(PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_bumps_updated_at() {
        let mut conv = Conversation::new("t1");
        let before = conv.updated_at;
        conv.push(Message::human("hi"));
        assert!(conv.updated_at >= before);
        assert_eq!(conv.messages.len(), 1);
    }

    #[test]
    fn test_summary_preview_truncated() {
        let mut conv = Conversation::new("t1");
        conv.push(Message::ai("x".repeat(300)));
        let summary = conv.summary();
        assert_eq!(summary.message_count, 1);
        assert_eq!(summary.last_message.unwrap().chars().count(), PREVIEW_CHARS);
    }

    #[test]
    fn test_summary_preview_multibyte_safe() {
        let mut conv = Conversation::new("t1");
        conv.push(Message::ai("é".repeat(150)));
        let preview = conv.summary().last_message.unwrap();
        assert_eq!(preview.chars().count(), PREVIEW_CHARS);
    }

    #[test]
    fn test_empty_conversation_has_no_preview() {
        let conv = Conversation::new("t1");
        assert!(conv.summary().last_message.is_none());
    }
}
