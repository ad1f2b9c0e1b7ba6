use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use maquette_engine::{
    AgentInvoker, EngineInput, InvokerSettings, ScriptedEngine, FALLBACK_ANSWER,
};
use maquette_types::{Message, StreamEvent};
use serde_json::json;

fn input() -> EngineInput {
    EngineInput {
        run_id: "run-1".to_string(),
        thread_id: "thread-1".to_string(),
        system_prompt: String::new(),
        messages: vec![Message::human("a site for my bakery")],
    }
}

fn fast_invoker() -> AgentInvoker {
    AgentInvoker::new(InvokerSettings {
        chunk_size: 10,
        chunk_delay: Duration::ZERO,
    })
}

async fn collect(engine: ScriptedEngine) -> Vec<StreamEvent> {
    fast_invoker()
        .stream(Arc::new(engine), input())
        .collect()
        .await
}

#[tokio::test]
async fn test_tool_round_event_ordering() {
    let engine = ScriptedEngine::new()
        .then_tool_round(
            "extract_project_brief",
            "call_1",
            json!({"message": "a site"}),
            "{\"industry\":\"bakery\"}",
        )
        .then_answer("Here is your mockup plan.");

    let events = collect(engine).await;

    let start = events
        .iter()
        .position(|e| matches!(e, StreamEvent::ToolExecutionStart { .. }))
        .unwrap();
    let complete = events
        .iter()
        .position(|e| matches!(e, StreamEvent::ToolExecutionComplete { .. }))
        .unwrap();
    let first_token = events
        .iter()
        .position(|e| matches!(e, StreamEvent::StreamToken { .. }))
        .unwrap();

    assert!(start < complete);
    assert!(complete < first_token);
    assert!(matches!(
        events.last().unwrap(),
        StreamEvent::StreamEnd { thread_id } if thread_id == "thread-1"
    ));
}

#[tokio::test]
async fn test_tokens_reassemble_final_answer() {
    let answer = "A fairly long answer that will be split over several token frames.";
    let events = collect(ScriptedEngine::answering(answer)).await;

    let joined: String = events
        .iter()
        .filter_map(|e| match e {
            StreamEvent::StreamToken { token } => Some(token.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(joined, answer);
}

#[tokio::test]
async fn test_last_answer_wins() {
    let engine = ScriptedEngine::new()
        .then_answer("first draft")
        .then_answer("final draft");
    let events = collect(engine).await;

    let joined: String = events
        .iter()
        .filter_map(|e| match e {
            StreamEvent::StreamToken { token } => Some(token.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(joined, "final draft");
}

#[tokio::test]
async fn test_engine_failure_degrades_to_fallback() {
    let engine = ScriptedEngine::new()
        .then_tool_round("extract_project_brief", "call_1", json!({}), "ok")
        .then_fail("model exploded");

    let events = collect(engine).await;
    let tail: Vec<&StreamEvent> = events.iter().rev().take(3).collect();

    assert!(matches!(tail[2], StreamEvent::ToolExecutionError { tool, error }
        if tool == "agent_run" && error.contains("model exploded")));
    assert!(matches!(tail[1], StreamEvent::StreamToken { token } if token == FALLBACK_ANSWER));
    assert!(matches!(tail[0], StreamEvent::StreamEnd { .. }));
}

#[tokio::test]
async fn test_unrecognized_shapes_are_skipped() {
    let engine = ScriptedEngine::new()
        .then_update(json!({"kind": "telemetry", "tokens_used": 42}))
        .then_update(json!({"content": 17}))
        .then_answer("ok");

    let events = collect(engine).await;
    assert!(events
        .iter()
        .all(|e| !matches!(e, StreamEvent::Error { .. })));
    let tokens = events
        .iter()
        .filter(|e| matches!(e, StreamEvent::StreamToken { .. }))
        .count();
    assert_eq!(tokens, 1);
}

#[tokio::test]
async fn test_invoke_returns_final_answer() {
    let engine = ScriptedEngine::new()
        .then_tool_round("render_mockup", "call_2", json!({}), "rendered")
        .then_answer("done");

    let content = fast_invoker()
        .invoke(Arc::new(engine), input())
        .await
        .unwrap();
    assert_eq!(content, "done");
}

#[tokio::test]
async fn test_invoke_surfaces_engine_error() {
    let engine = ScriptedEngine::new().then_fail("boom");
    let result = fast_invoker().invoke(Arc::new(engine), input()).await;
    assert!(result.is_err());
}
