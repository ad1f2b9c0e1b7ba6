#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use maquette_api::{app::build_router, config::Config, state::AppState};
use maquette_engine::{AgentRegistry, ScriptedEngine};
use maquette_types::AgentDefinition;
use serde_json::Value;
use tower::ServiceExt;

pub const AGENT_ID: &str = "mockup";

pub fn test_state(engine: ScriptedEngine) -> Arc<AppState> {
    state_with_auth(engine, false)
}

pub fn secured_state(engine: ScriptedEngine) -> Arc<AppState> {
    state_with_auth(engine, true)
}

fn state_with_auth(engine: ScriptedEngine, auth_required: bool) -> Arc<AppState> {
    let mut config = Config::default();
    config.auth.required = auth_required;
    config.stream.chunk_delay_ms = 0;
    config.stream.cleanup_grace_ms = 50;

    let agents = AgentRegistry::new().register(
        AgentDefinition::new(
            AGENT_ID,
            "Mockup Studio",
            "Drafts website mockups",
            "You draft website mockups.",
        ),
        Arc::new(engine),
    );

    Arc::new(AppState::new(config, agents))
}

pub fn app(state: &Arc<AppState>) -> Router {
    build_router(Arc::clone(state))
}

pub async fn post_json(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn get_json(app: &Router, path: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(path).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Run a streaming request to completion and return the raw SSE body
pub async fn post_sse(app: &Router, path: &str, body: Value) -> (StatusCode, String, String) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
}

/// Parse an SSE body into (event name, optional JSON data) frames
pub fn parse_sse(raw: &str) -> Vec<(String, Option<Value>)> {
    raw.split("\n\n")
        .filter(|frame| !frame.trim().is_empty())
        .map(|frame| {
            let mut name = String::new();
            let mut data = None;
            for line in frame.lines() {
                if let Some(rest) = line.strip_prefix("event: ") {
                    name = rest.to_string();
                } else if let Some(rest) = line.strip_prefix("data: ") {
                    data = Some(serde_json::from_str(rest).unwrap());
                }
            }
            (name, data)
        })
        .collect()
}
