use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Closed protocol-event vocabulary for one streamed agent run.
///
/// The Agent Invoker is the single point translating raw engine output into
/// these variants; everything downstream (SSE framing, tests, clients) only
/// ever sees this set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Run accepted, stream opened. No payload.
    StreamStart,

    /// An agent-requested tool call began
    ToolExecutionStart {
        tool: String,
        arguments: Value,
        call_id: String,
    },

    /// A tool call returned
    ToolExecutionComplete {
        tool: String,
        output: String,
        call_id: String,
    },

    /// The underlying run raised while processing
    ToolExecutionError { tool: String, error: String },

    /// A fragment of the assistant's natural-language answer
    StreamToken { token: String },

    /// Run finished normally
    StreamEnd { thread_id: String },

    /// Unrecoverable failure terminating the stream early
    Error { error: String },
}

impl StreamEvent {
    /// Wire name used for the SSE `event:` field
    pub fn name(&self) -> &'static str {
        match self {
            Self::StreamStart => "stream_start",
            Self::ToolExecutionStart { .. } => "tool_execution_start",
            Self::ToolExecutionComplete { .. } => "tool_execution_complete",
            Self::ToolExecutionError { .. } => "tool_execution_error",
            Self::StreamToken { .. } => "stream_token",
            Self::StreamEnd { .. } => "stream_end",
            Self::Error { .. } => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_wire_names() {
        assert_eq!(StreamEvent::StreamStart.name(), "stream_start");
        assert_eq!(
            StreamEvent::StreamEnd { thread_id: "t".into() }.name(),
            "stream_end"
        );
    }

    #[test]
    fn test_event_tagged_serialization() {
        let event = StreamEvent::ToolExecutionStart {
            tool: "render_mockup".into(),
            arguments: json!({"page": "index"}),
            call_id: "call_1".into(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "tool_execution_start");
        assert_eq!(value["tool"], "render_mockup");
        assert_eq!(value["call_id"], "call_1");
    }
}
