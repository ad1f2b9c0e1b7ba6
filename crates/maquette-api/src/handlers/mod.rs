pub mod invoke;
pub mod stop;
pub mod stream;

use serde::Deserialize;
use utoipa::ToSchema;

/// Chat turn payload shared by the invoke and stream endpoints. Clients send
/// either `message` or `input`; both are accepted.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub thread_id: Option<String>,
}

impl ChatRequest {
    /// The user's text, if a non-blank one was supplied
    pub fn text(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.input.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_prefers_message_over_input() {
        let req: ChatRequest =
            serde_json::from_str(r#"{"message": "a", "input": "b"}"#).unwrap();
        assert_eq!(req.text(), Some("a"));
    }

    #[test]
    fn test_blank_message_rejected() {
        let req: ChatRequest = serde_json::from_str(r#"{"message": "   "}"#).unwrap();
        assert!(req.text().is_none());
    }

    #[test]
    fn test_empty_body_has_no_text() {
        let req: ChatRequest = serde_json::from_str("{}").unwrap();
        assert!(req.text().is_none());
        assert!(req.thread_id.is_none());
    }
}
