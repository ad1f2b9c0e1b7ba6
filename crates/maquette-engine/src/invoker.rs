use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use futures::Stream;
use maquette_types::StreamEvent;
use serde_json::Value;

use crate::engine::{AgentEngine, EngineError, EngineInput};

/// Synthetic tool name attached to run-level failures
const RUN_TOOL: &str = "agent_run";

/// Degraded answer streamed when the engine raises mid-run. A partial reply
/// is always preferred over silently closing the connection.
pub const FALLBACK_ANSWER: &str =
    "I ran into a problem while working on that. Please try again or rephrase your request.";

/// Presentation pacing for the final answer. The chunking is cosmetic: the
/// concatenation of emitted tokens always equals the stored answer.
#[derive(Debug, Clone, Copy)]
pub struct InvokerSettings {
    pub chunk_size: usize,
    pub chunk_delay: Duration,
}

impl Default for InvokerSettings {
    fn default() -> Self {
        Self {
            chunk_size: 10,
            chunk_delay: Duration::from_millis(15),
        }
    }
}

/// Drives an [`AgentEngine`] run and translates its raw updates into the
/// closed [`StreamEvent`] vocabulary. This is the only place raw engine
/// shapes are interpreted.
#[derive(Debug, Clone, Copy, Default)]
pub struct AgentInvoker {
    settings: InvokerSettings,
}

/// What one raw engine update means, if anything
enum RawUpdate {
    ToolStarts(Vec<(String, Value, String)>),
    ToolResult {
        tool: String,
        output: String,
        call_id: String,
    },
    Answer(String),
    Ignored,
}

impl AgentInvoker {
    pub fn new(settings: InvokerSettings) -> Self {
        Self { settings }
    }

    /// Run the engine and yield protocol events as they occur.
    ///
    /// Emits everything except `stream_start` (the dispatcher owns the
    /// session framing). Always terminates with `stream_end`, including on
    /// engine failure, where the degraded `tool_execution_error` +
    /// `stream_token` sequence is emitted first.
    pub fn stream(
        &self,
        engine: Arc<dyn AgentEngine>,
        input: EngineInput,
    ) -> impl Stream<Item = StreamEvent> + Send + 'static {
        let settings = self.settings;
        stream! {
            let thread_id = input.thread_id.clone();
            let run_id = input.run_id.clone();
            let mut rx = engine.spawn_run(input);

            let mut answer = String::new();
            let mut degraded = false;

            while let Some(update) = rx.recv().await {
                match update {
                    Ok(value) => match classify(&value) {
                        RawUpdate::ToolStarts(calls) => {
                            for (tool, arguments, call_id) in calls {
                                yield StreamEvent::ToolExecutionStart { tool, arguments, call_id };
                            }
                        }
                        RawUpdate::ToolResult { tool, output, call_id } => {
                            yield StreamEvent::ToolExecutionComplete { tool, output, call_id };
                        }
                        RawUpdate::Answer(text) => answer = text,
                        RawUpdate::Ignored => {
                            tracing::debug!(run_id = %run_id, "skipping unrecognized engine update");
                        }
                    },
                    Err(e) => {
                        tracing::warn!(run_id = %run_id, error = %e, "engine raised mid-run, degrading");
                        yield StreamEvent::ToolExecutionError {
                            tool: RUN_TOOL.to_string(),
                            error: e.to_string(),
                        };
                        yield StreamEvent::StreamToken { token: FALLBACK_ANSWER.to_string() };
                        degraded = true;
                        break;
                    }
                }
            }

            if !degraded {
                for token in chunk_text(&answer, settings.chunk_size) {
                    if !settings.chunk_delay.is_zero() {
                        tokio::time::sleep(settings.chunk_delay).await;
                    }
                    yield StreamEvent::StreamToken { token };
                }
            }

            yield StreamEvent::StreamEnd { thread_id };
        }
    }

    /// Drive the run to completion and return the final answer.
    ///
    /// The non-streaming counterpart: no partial delivery, and engine
    /// failures surface as errors instead of degraded events.
    pub async fn invoke(
        &self,
        engine: Arc<dyn AgentEngine>,
        input: EngineInput,
    ) -> Result<String, EngineError> {
        let mut rx = engine.spawn_run(input);
        let mut answer = String::new();

        while let Some(update) = rx.recv().await {
            if let RawUpdate::Answer(text) = classify(&update?) {
                answer = text;
            }
        }

        Ok(answer)
    }
}

/// Interpret one raw update. Shapes without recognizable tool_call/content
/// fields are reported as `Ignored` rather than raising: the engine is an
/// external dependency and may grow new shapes at any time.
fn classify(value: &Value) -> RawUpdate {
    if let Some(calls) = value.get("tool_calls").and_then(Value::as_array) {
        let starts: Vec<_> = calls
            .iter()
            .filter_map(|call| {
                let tool = call.get("name")?.as_str()?.to_string();
                let call_id = call
                    .get("id")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let arguments = call
                    .get("args")
                    .or_else(|| call.get("arguments"))
                    .cloned()
                    .unwrap_or_else(|| Value::Object(Default::default()));
                Some((tool, arguments, call_id))
            })
            .collect();
        if !starts.is_empty() {
            return RawUpdate::ToolStarts(starts);
        }
    }

    if let (Some(call_id), Some(content)) = (
        value.get("tool_call_id").and_then(Value::as_str),
        value.get("content").and_then(Value::as_str),
    ) {
        return RawUpdate::ToolResult {
            tool: value
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or("tool")
                .to_string(),
            output: content.to_string(),
            call_id: call_id.to_string(),
        };
    }

    if let Some(content) = value.get("content").and_then(Value::as_str) {
        let role = value.get("role").and_then(Value::as_str).unwrap_or("ai");
        if !content.is_empty() && matches!(role, "ai" | "assistant") {
            return RawUpdate::Answer(content.to_string());
        }
    }

    RawUpdate::Ignored
}

/// Split into chunks of at most `size` characters, char-boundary safe
fn chunk_text(text: &str, size: usize) -> Vec<String> {
    let size = size.max(1);
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
