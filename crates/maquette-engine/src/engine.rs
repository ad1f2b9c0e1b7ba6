use maquette_types::Message;
use thiserror::Error;
use tokio::sync::mpsc;

/// Everything an engine needs for one run: the conversation so far plus
/// correlation ids. The last message is the new human turn.
#[derive(Debug, Clone)]
pub struct EngineInput {
    pub run_id: String,
    pub thread_id: String,
    pub system_prompt: String,
    pub messages: Vec<Message>,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("agent run failed: {0}")]
    Run(String),
}

/// Raw engine output. Engines are external and their message shapes are
/// outside our control, so updates arrive as untyped JSON; the invoker is
/// the single place that interprets them.
pub type EngineUpdate = Result<serde_json::Value, EngineError>;

/// External tool-calling engine.
///
/// `spawn_run` starts the run in the background and hands back a channel of
/// raw updates, mirroring how the run is consumed: one update at a time, at
/// the receiver's pace.
pub trait AgentEngine: Send + Sync {
    fn spawn_run(&self, input: EngineInput) -> mpsc::Receiver<EngineUpdate>;
}
