use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message roles as they appear on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Human,
    Ai,
    Tool,
}

/// A tool invocation requested by the agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    /// Arguments as parsed JSON (engines send a JSON object, not a string)
    pub arguments: Value,
}

/// One entry in a conversation log. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    /// Create a human (user) message timestamped now
    pub fn human(content: impl Into<String>) -> Self {
        Self::new(Role::Human, content)
    }

    /// Create an assistant message timestamped now
    pub fn ai(content: impl Into<String>) -> Self {
        Self::new(Role::Ai, content)
    }

    /// Create a tool-result message tied to a tool call
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::new(Role::Tool, content)
        }
    }

    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }
}
