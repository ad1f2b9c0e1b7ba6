use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::mpsc;

use crate::engine::{AgentEngine, EngineError, EngineInput, EngineUpdate};

/// Replays a fixed sequence of raw updates. Used as the engine double in
/// tests, where runs must be deterministic and pausable.
#[derive(Debug, Clone, Default)]
pub struct ScriptedEngine {
    steps: Vec<ScriptedStep>,
    step_delay: Duration,
}

#[derive(Debug, Clone)]
enum ScriptedStep {
    Update(Value),
    Fail(String),
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine that emits a single final answer and nothing else
    pub fn answering(text: impl Into<String>) -> Self {
        Self::new().then_answer(text)
    }

    /// Pause between steps, to let tests interleave stop requests
    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    pub fn then_update(mut self, value: Value) -> Self {
        self.steps.push(ScriptedStep::Update(value));
        self
    }

    /// One tool round: an assistant tool_call followed by its result
    pub fn then_tool_round(self, tool: &str, call_id: &str, args: Value, output: &str) -> Self {
        self.then_update(json!({
            "role": "ai",
            "content": "",
            "tool_calls": [{"id": call_id, "name": tool, "args": args}],
        }))
        .then_update(json!({
            "role": "tool",
            "name": tool,
            "tool_call_id": call_id,
            "content": output,
        }))
    }

    pub fn then_answer(self, text: impl Into<String>) -> Self {
        self.then_update(json!({"role": "ai", "content": text.into()}))
    }

    pub fn then_fail(mut self, message: impl Into<String>) -> Self {
        self.steps.push(ScriptedStep::Fail(message.into()));
        self
    }
}

impl AgentEngine for ScriptedEngine {
    fn spawn_run(&self, _input: EngineInput) -> mpsc::Receiver<EngineUpdate> {
        let (tx, rx) = mpsc::channel(64);
        let steps = self.steps.clone();
        let delay = self.step_delay;

        tokio::spawn(async move {
            for step in steps {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                let update = match step {
                    ScriptedStep::Update(value) => Ok(value),
                    ScriptedStep::Fail(message) => Err(EngineError::Run(message)),
                };
                let failed = update.is_err();
                if tx.send(update).await.is_err() || failed {
                    return;
                }
            }
        });

        rx
    }
}
